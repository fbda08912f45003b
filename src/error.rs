use crate::intake::IntakeError;

/// Failure categories surfaced while processing a batch.
///
/// Every variant is caught at per-file granularity by the pipeline and turned
/// into a log line; none of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("AI response could not be parsed as JSON: {raw}")]
    AiResponse { raw: String },

    #[error("no AI API key supplied")]
    MissingApiKey,

    #[error("AI response contained no text")]
    AiEmptyResponse,

    #[error("file upload failed: {0}")]
    Upload(String),

    #[error("no geocode candidates for '{query}'")]
    NoCandidates { query: String },

    #[error("feature layer rejected the feature: {message}")]
    FeatureRejected { message: String },

    #[error("sign in failed: {0}")]
    SignIn(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Reads a non-success response body into an [`Error::Http`].
    pub(crate) async fn from_response(service: &'static str, resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        Error::Http {
            service,
            status,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_error_keeps_raw_text() {
        let err = Error::AiResponse {
            raw: "not json at all".to_string(),
        };
        assert!(err.to_string().contains("not json at all"));
    }

    #[test]
    fn intake_error_is_transparent() {
        let err: Error = IntakeError::NoRecognizedFiles.into();
        assert_eq!(err.to_string(), IntakeError::NoRecognizedFiles.to_string());
    }
}

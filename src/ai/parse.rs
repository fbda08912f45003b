use super::schema::{ExtractionResult, PermitRecord, ProjectRecord};
use crate::config::ExtractionMode;
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[ \t]*(?:json|JSON)?[ \t]*\r?\n?(.*?)(?:```|$)").expect("fence pattern")
});

/// Strip a Markdown code fence (and a `json` language tag) around model
/// output. Unfenced text is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    match FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse model text into the record shape for `mode`. On failure the raw
/// text travels with the error for the log.
pub fn parse_extraction(text: &str, mode: ExtractionMode) -> Result<ExtractionResult> {
    let body = strip_code_fence(text);
    let parsed = match mode {
        ExtractionMode::Permit => {
            serde_json::from_str::<PermitRecord>(body).map(ExtractionResult::Permit)
        }
        ExtractionMode::Project => {
            serde_json::from_str::<ProjectRecord>(body).map(ExtractionResult::Project)
        }
    };
    parsed.map_err(|e| {
        tracing::debug!(error = %e, "model output is not the expected JSON");
        Error::AiResponse {
            raw: text.to_string(),
        }
    })
}

/// Shorten a key-check reply for display.
pub fn truncate_reply(text: &str, max_chars: usize) -> String {
    let text = strip_code_fence(text);
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_is_unwrapped() {
        let text = "```json\n{\"address\": \"1 Main\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"address\": \"1 Main\"}");
    }

    #[test]
    fn fence_without_language_tag() {
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
    }

    #[test]
    fn unterminated_fence_keeps_body() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn permit_parses_from_fenced_text() {
        let text = concat!(
            "```json\n",
            r#"{"address":"5 Oak St Marion Indiana 46952","size":1.5,"material":"copper"}"#,
            "\n```"
        );
        match parse_extraction(text, ExtractionMode::Permit).unwrap() {
            ExtractionResult::Permit(p) => {
                assert_eq!(p.address.as_deref(), Some("5 Oak St Marion Indiana 46952"));
                assert_eq!(p.size, Some(1.5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_json_carries_raw_text() {
        let err =
            parse_extraction("Sorry, I can't read this.", ExtractionMode::Project).unwrap_err();
        match err {
            Error::AiResponse { raw } => assert_eq!(raw, "Sorry, I can't read this."),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reply_is_truncated_to_forty_chars() {
        let long = "a".repeat(50);
        assert_eq!(truncate_reply(&long, 40), format!("{}...", "a".repeat(40)));
        assert_eq!(truncate_reply("Wobbly purple toaster", 40), "Wobbly purple toaster");
    }
}

use super::inline::{fits_inline, inline_part};
use super::parse::{parse_extraction, truncate_reply};
use super::prompt::{permit_prompt, project_prompt, project_response_schema, KEY_CHECK_PROMPT};
use super::schema::{
    Content, ExtractionResult, FileData, GenerateRequest, GenerateResponse, GenerationConfig,
    RequestPart,
};
use super::upload::Uploader;
use super::Extractor;
use crate::config::{AiConfig, ExtractionMode};
use crate::error::{Error, Result};
use crate::intake::UploadedFile;
use async_trait::async_trait;
use std::time::Duration;

/// Longest key-check reply shown before truncation.
const KEY_CHECK_REPLY_CHARS: usize = 40;

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    mode: ExtractionMode,
    address_suffix: String,
    inline_limit: u64,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, config: &AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into().trim().to_string(),
            mode: config.mode,
            address_suffix: config.address_suffix.clone(),
            inline_limit: config.inline_limit_bytes,
            poll_attempts: config.upload_poll_attempts,
            poll_interval: Duration::from_millis(config.upload_poll_interval_ms),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Check the key with a throwaway prompt. Returns the (shortened) reply.
    pub async fn check_key(&self) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart::Text {
                    text: KEY_CHECK_PROMPT,
                }],
            }],
            generation_config: None,
        };
        let text = self.generate(&request).await?;
        Ok(truncate_reply(&text, KEY_CHECK_REPLY_CHARS))
    }

    /// Send a request and return the first candidate's text.
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String> {
        tracing::debug!(model = %self.model, "calling generateContent");
        let resp = self
            .http
            .post(self.generate_url())
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body).unwrap_or_default();
        if let Some(err) = parsed.error.as_ref() {
            return Err(Error::Http {
                service: "gemini",
                status: if err.code == 0 { status.as_u16() } else { err.code },
                body: err.message.clone(),
            });
        }
        if !status.is_success() {
            return Err(Error::Http {
                service: "gemini",
                status: status.as_u16(),
                body,
            });
        }
        parsed
            .first_text()
            .map(str::to_string)
            .ok_or(Error::AiEmptyResponse)
    }

    async fn file_part(&self, file: &UploadedFile) -> Result<RequestPart<'static>> {
        if fits_inline(file, self.inline_limit) {
            return Ok(inline_part(file));
        }
        tracing::info!(
            file = %file.name,
            bytes = file.size(),
            "file exceeds inline limit, uploading"
        );
        let uploader = Uploader {
            http: &self.http,
            base_url: &self.base_url,
            api_key: &self.api_key,
            poll_attempts: self.poll_attempts,
            poll_interval: self.poll_interval,
        };
        let uploaded = uploader.upload(file).await?;
        let mime_type = if uploaded.mime_type.is_empty() {
            file.mime_type.clone()
        } else {
            uploaded.mime_type
        };
        Ok(RequestPart::FileData {
            file_data: FileData {
                mime_type,
                file_uri: uploaded.uri,
            },
        })
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract(&self, file: &UploadedFile) -> Result<ExtractionResult> {
        if self.api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        let prompt = match self.mode {
            ExtractionMode::Permit => permit_prompt(&self.address_suffix),
            ExtractionMode::Project => project_prompt(),
        };
        let generation_config = match self.mode {
            ExtractionMode::Permit => None,
            ExtractionMode::Project => Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: project_response_schema(),
            }),
        };
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart::Text { text: &prompt }, self.file_part(file).await?],
            }],
            generation_config,
        };
        let text = self.generate(&request).await?;
        parse_extraction(&text, self.mode)
    }
}

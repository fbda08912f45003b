//! Resumable upload of large files to the model provider's file store.
//!
//! Three steps: `start` returns an upload URL in a response header, a single
//! `upload, finalize` request sends the bytes, and a metadata fetch waits for
//! the file to leave the `PROCESSING` state.

use super::schema::{UploadResponse, UploadedFileRef};
use crate::error::{Error, Result};
use crate::intake::UploadedFile;
use serde_json::json;
use std::time::Duration;

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

pub(crate) struct Uploader<'a> {
    pub http: &'a reqwest::Client,
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

impl Uploader<'_> {
    pub async fn upload(&self, file: &UploadedFile) -> Result<UploadedFileRef> {
        let upload_url = self.start(file).await?;
        let uploaded = self.transfer(&upload_url, file).await?;
        self.wait_active(&uploaded.name).await
    }

    async fn start(&self, file: &UploadedFile) -> Result<String> {
        let url = format!(
            "{}/upload/v1beta/files?key={}",
            self.base_url,
            urlencoding::encode(self.api_key)
        );
        tracing::debug!(file = %file.name, bytes = file.size(), "starting resumable upload");
        let resp = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", file.size().to_string())
            .header("X-Goog-Upload-Header-Content-Type", file.mime_type.as_str())
            .json(&json!({ "file": { "display_name": file.name } }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("gemini upload", resp).await);
        }
        resp.headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::Upload("start response carried no upload URL".to_string()))
    }

    async fn transfer(&self, upload_url: &str, file: &UploadedFile) -> Result<UploadedFileRef> {
        let resp = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(file.data.clone())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("gemini upload", resp).await);
        }
        let parsed: UploadResponse = resp.json().await?;
        Ok(parsed.file)
    }

    /// Fetch the file's metadata until it leaves `PROCESSING`. The fetch
    /// always happens at least once, whatever the finalize response said.
    async fn wait_active(&self, name: &str) -> Result<UploadedFileRef> {
        let attempts = self.poll_attempts.max(1);
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }
            let file = self.metadata(name).await?;
            match file.state.as_deref() {
                Some("ACTIVE") | None => return Ok(file),
                Some("FAILED") => return Err(Error::Upload(format!("{name} failed processing"))),
                state => tracing::debug!(file = name, ?state, attempt, "waiting for upload"),
            }
        }
        Err(Error::Upload(format!("{name} still processing after {attempts} checks")))
    }

    async fn metadata(&self, name: &str) -> Result<UploadedFileRef> {
        let url = format!(
            "{}/v1beta/{}?key={}",
            self.base_url,
            name,
            urlencoding::encode(self.api_key)
        );
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::from_response("gemini files", resp).await);
        }
        Ok(resp.json().await?)
    }
}

//! Generative-AI extraction: send a scan with a fixed instruction, get a
//! structured record back.

pub mod client;
mod inline;
pub mod parse;
pub mod prompt;
pub mod schema;
mod upload;

pub use client::GeminiClient;
pub use schema::{ExtractionResult, Part, PermitRecord, ProjectRecord, UploadedFileRef};

use crate::error::Result;
use crate::intake::UploadedFile;
use async_trait::async_trait;

/// Reads one file into a structured record.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, file: &UploadedFile) -> Result<ExtractionResult>;
}

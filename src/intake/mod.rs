//! File intake: one dropped image, PDF, or zip archive in, a list of
//! in-memory files out.

pub mod archive;
pub mod mime;
pub mod schema;
pub mod source;

pub use schema::{FileKind, IntakeOutcome, UploadedFile};

use crate::config::IntakeConfig;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("No file dropped.")]
    Empty,

    #[error("File is too large. Maximum allowed size is {}MB.", .max_bytes / (1024 * 1024))]
    TooLarge { max_bytes: u64 },

    #[error("Please drop an image, a PDF, or a zip containing them.")]
    Unsupported,

    #[error("No image files found in the zip.")]
    NoRecognizedFiles,

    #[error("Error reading zip file: {0}")]
    BadArchive(String),

    #[error("Could not read file: {0}")]
    Read(String),
}

/// Accept a dropped blob, expanding archives.
pub fn accept(
    name: &str,
    data: Vec<u8>,
    declared_mime: Option<&str>,
    config: &IntakeConfig,
) -> Result<IntakeOutcome, IntakeError> {
    if data.len() as u64 > config.max_file_size_bytes {
        return Err(IntakeError::TooLarge {
            max_bytes: config.max_file_size_bytes,
        });
    }
    let mime_type = mime::resolve_mime_type(name, declared_mime, &data);
    let files = match mime::classify(name, &mime_type) {
        FileKind::Zip => {
            let files = archive::expand_zip(&data, config.max_file_size_bytes)?;
            if files.is_empty() {
                return Err(IntakeError::NoRecognizedFiles);
            }
            files
        }
        FileKind::Image | FileKind::Pdf => vec![UploadedFile::new(name, data, mime_type)],
        FileKind::Other => return Err(IntakeError::Unsupported),
    };

    let message = received_message(&files);
    tracing::info!(count = files.len(), source = %name, "intake accepted files");
    Ok(IntakeOutcome { files, message })
}

/// Read a path from disk and [`accept`] it. Only the first of several
/// dropped paths is considered.
pub async fn accept_paths(
    paths: &[impl AsRef<Path>],
    config: &IntakeConfig,
) -> Result<IntakeOutcome, IntakeError> {
    let first = paths.first().ok_or(IntakeError::Empty)?;
    if paths.len() > 1 {
        tracing::warn!(ignored = paths.len() - 1, "only the first dropped path is processed");
    }
    let dropped = source::read_dropped(first.as_ref(), config.max_file_size_bytes).await?;
    accept(&dropped.name, dropped.data, None, config)
}

fn received_message(files: &[UploadedFile]) -> String {
    let noun = if files.iter().all(|f| f.mime_type == "application/pdf") {
        "PDF file"
    } else if files.iter().all(|f| f.mime_type.starts_with("image/")) {
        "image file"
    } else {
        "file"
    };
    let plural = if files.len() == 1 { "" } else { "s" };
    format!("Received {} {noun}{plural}:", files.len())
}

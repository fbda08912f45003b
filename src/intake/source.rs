use super::IntakeError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A dropped file read from disk, before classification.
#[derive(Debug)]
pub struct DroppedFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

/// Read a dropped file, refusing anything over `max_size` before the bytes
/// are loaded.
pub async fn read_dropped(path: &Path, max_size: u64) -> Result<DroppedFile, IntakeError> {
    let meta = fs::metadata(path)
        .await
        .map_err(|e| IntakeError::Read(format!("{}: {e}", path.display())))?;
    if !meta.is_file() {
        return Err(IntakeError::Read(format!("{} is not a file", path.display())));
    }
    if meta.len() > max_size {
        return Err(IntakeError::TooLarge { max_bytes: max_size });
    }
    let data = fs::read(path)
        .await
        .map_err(|e| IntakeError::Read(format!("{}: {e}", path.display())))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(DroppedFile { name, data })
}

use serde::Serialize;

/// A file held in memory for the duration of one processing run.
#[derive(Clone, Serialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Zip,
    Other,
}

/// Result of a successful drop: the files to process and the message shown
/// to the user.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub files: Vec<UploadedFile>,
    pub message: String,
}

impl IntakeOutcome {
    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }
}

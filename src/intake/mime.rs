use super::schema::FileKind;

/// Raster extensions accepted as permit scans.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "svg",
];

fn extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

pub fn is_image_name(filename: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension(filename).as_str())
}

/// Guess MIME type from filename extension.
pub fn guess_mime_type(filename: &str) -> String {
    match extension(filename).as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Best MIME type for a file: the declared one when it is specific, then the
/// extension, then the leading bytes.
pub fn resolve_mime_type(filename: &str, declared: Option<&str>, data: &[u8]) -> String {
    if let Some(declared) = declared {
        if !declared.is_empty() && declared != "application/octet-stream" {
            return declared.to_string();
        }
    }
    let guessed = guess_mime_type(filename);
    if guessed != "application/octet-stream" {
        return guessed;
    }
    sniff_mime_type(data).unwrap_or(guessed)
}

/// Identify content by magic bytes.
pub fn sniff_mime_type(data: &[u8]) -> Option<String> {
    if data.starts_with(b"%PDF-") {
        return Some("application/pdf".to_string());
    }
    if data.starts_with(b"PK\x03\x04") {
        return Some("application/zip".to_string());
    }
    image::guess_format(data)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Sort a named blob into the kinds intake cares about.
pub fn classify(filename: &str, mime_type: &str) -> FileKind {
    let lower = filename.to_lowercase();
    if mime_type == "application/zip" || lower.ends_with(".zip") {
        FileKind::Zip
    } else if mime_type == "application/pdf" || lower.ends_with(".pdf") {
        FileKind::Pdf
    } else if mime_type.starts_with("image/") || is_image_name(filename) {
        FileKind::Image
    } else {
        FileKind::Other
    }
}

use super::mime::{classify, resolve_mime_type};
use super::schema::{FileKind, UploadedFile};
use super::IntakeError;
use std::io::{Cursor, Read};

/// Expand a zip archive in memory, keeping images and PDFs.
///
/// Directories, resource-fork entries and unrecognized members are skipped.
/// The expanded total is held to `max_expanded` bytes.
pub fn expand_zip(data: &[u8], max_expanded: u64) -> Result<Vec<UploadedFile>, IntakeError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| IntakeError::BadArchive(e.to_string()))?;

    let mut files = Vec::new();
    let mut expanded: u64 = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| IntakeError::BadArchive(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name.starts_with("__MACOSX/") {
            continue;
        }
        let guessed = resolve_mime_type(&name, None, &[]);
        if !matches!(classify(&name, &guessed), FileKind::Image | FileKind::Pdf) {
            tracing::debug!(entry = %name, "skipping unrecognized zip member");
            continue;
        }

        expanded = expanded.saturating_add(entry.size());
        if expanded > max_expanded {
            return Err(IntakeError::TooLarge {
                max_bytes: max_expanded,
            });
        }

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| IntakeError::BadArchive(format!("{name}: {e}")))?;
        files.push(UploadedFile::new(name, buf, guessed));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, bytes) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn keeps_images_and_pdfs_only() {
        let data = build_zip(&[
            ("scans/", &b""[..]),
            ("scans/a.jpg", &b"jpeg-bytes"[..]),
            ("scans/b.PDF", &b"%PDF-1.4"[..]),
            ("readme.txt", &b"hello"[..]),
            ("__MACOSX/scans/._a.jpg", &b"fork"[..]),
        ]);
        let files = expand_zip(&data, 1024).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["scans/a.jpg", "scans/b.PDF"]);
        assert_eq!(files[0].mime_type, "image/jpeg");
        assert_eq!(files[0].data, b"jpeg-bytes");
        assert_eq!(files[1].mime_type, "application/pdf");
    }

    #[test]
    fn empty_of_recognized_files_is_ok_and_empty() {
        let data = build_zip(&[("notes.txt", &b"nothing here"[..])]);
        assert!(expand_zip(&data, 1024).unwrap().is_empty());
    }

    #[test]
    fn garbage_is_bad_archive() {
        let err = expand_zip(b"definitely not a zip", 1024).unwrap_err();
        assert!(matches!(err, IntakeError::BadArchive(_)));
    }

    #[test]
    fn expanded_size_is_capped() {
        let data = build_zip(&[("a.png", &[0u8; 600][..]), ("b.png", &[0u8; 600][..])]);
        let err = expand_zip(&data, 1000).unwrap_err();
        assert!(matches!(err, IntakeError::TooLarge { .. }));
    }
}

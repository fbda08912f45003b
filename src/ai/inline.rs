use super::schema::{InlineData, RequestPart};
use crate::intake::UploadedFile;
use base64::Engine;

/// Encode a file as an `inline_data` request part.
pub(crate) fn inline_part(file: &UploadedFile) -> RequestPart<'static> {
    let data = base64::engine::general_purpose::STANDARD.encode(&file.data);
    RequestPart::InlineData {
        inline_data: InlineData {
            mime_type: file.mime_type.clone(),
            data,
        },
    }
}

/// Whether a file is small enough to send inline.
pub(crate) fn fits_inline(file: &UploadedFile, limit: u64) -> bool {
    // base64 grows the payload by a third
    file.size().saturating_mul(4) / 3 <= limit
}

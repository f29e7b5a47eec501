//! Image files are never stored as paths or handles. They are read once, encoded as a
//! self-contained `data:` URI and stored in the product's `image` field.

use crate::error::ImageError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Default upper bound for a selected image file.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// MIME type for a file, guessed from its extension.
pub fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Read an image file and return it as a data URI.
pub async fn read_image(path: &Path, max_bytes: u64) -> Result<String, ImageError> {
    let mime = mime_for(path);
    if !mime.starts_with("image/") {
        return Err(ImageError::NotAnImage {
            path: path.to_path_buf(),
            mime,
        });
    }

    let io_err = |source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
    if size > max_bytes {
        return Err(ImageError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(io_err)?;
    Ok(encode_data_uri(&bytes, &mime))
}

/// What a stored data URI holds, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub mime: String,
    pub bytes: usize,
}

/// Returns None for empty or malformed values.
pub fn describe_data_uri(uri: &str) -> Option<ImageSummary> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?.len();
    Some(ImageSummary {
        mime: if mime.is_empty() {
            "text/plain".to_string()
        } else {
            mime.to_string()
        },
        bytes,
    })
}

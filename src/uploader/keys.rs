use bytes::Bytes;
use regex::Regex;
use std::path::Path;

use crate::errors::{UploadError, UploadResult};

/// Maximum accepted size for a single image file (50MB).
const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// One locally selected file awaiting upload.
#[derive(Debug, Clone)]
pub struct PendingImage {
    /// Original file name as picked by the user; only its extension is used
    /// for key generation and content-type detection.
    pub file_name: String,
    pub bytes: Bytes,
}

impl PendingImage {
    pub fn new(file_name: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.to_string(),
            bytes: bytes.into(),
        }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Detect MIME type based on file extension
    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("bmp") => "image/bmp",
            _ => "image/png", // Default fallback
        }
    }
}

/// Derive a collision-resistant storage key for one pending image.
///
/// Keys are generated independently per file and carry no ordering
/// information, so concurrent batches can never collide or depend on
/// dispatch order.
pub fn storage_key(image: &PendingImage) -> String {
    let random_name = uuid::Uuid::new_v4().to_string();
    let extension = image.extension().unwrap_or_else(|| "png".to_string());
    format!("{}.{}", random_name, extension)
}

pub fn sanitize_file_name(file_name: &str) -> String {
    // Remove or replace unsafe characters in filenames
    let unsafe_chars = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
    let sanitized = unsafe_chars.replace_all(file_name.trim(), "_");

    // Limit length, cutting on a char boundary so multibyte names cannot
    // split a codepoint
    if sanitized.len() > 255 {
        let mut cut = 252;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &sanitized[..cut])
    } else {
        sanitized.to_string()
    }
}

/// Validate a whole selection before any upload is attempted. One bad file
/// rejects the selection so the user can fix it without half the batch
/// having already gone out.
pub fn validate_selection(selection: &[PendingImage]) -> UploadResult<()> {
    for image in selection {
        validate_image(image)?;
    }
    Ok(())
}

fn validate_image(image: &PendingImage) -> UploadResult<()> {
    let name = sanitize_file_name(&image.file_name);

    if name.is_empty() {
        return Err(UploadError::validation(
            "file_name",
            "File name cannot be empty",
        ));
    }

    match image.extension() {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
        Some(ext) => {
            return Err(UploadError::validation(
                "file_name",
                &format!("Unsupported file type .{} for {}", ext, name),
            ));
        }
        None => {
            return Err(UploadError::validation(
                "file_name",
                &format!("File {} must have an image extension", name),
            ));
        }
    }

    if image.bytes.is_empty() {
        return Err(UploadError::validation(
            "bytes",
            &format!("File {} is empty", name),
        ));
    }

    if image.bytes.len() > MAX_FILE_SIZE {
        return Err(UploadError::validation(
            "bytes",
            &format!("File {} too large (maximum 50MB)", name),
        ));
    }

    Ok(())
}

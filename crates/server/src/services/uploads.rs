//! Product image upload handling.
//!
//! Accepted files are written under the configured upload directory with
//! UUID filenames and served back at `/uploads/<name>`.

use std::path::PathBuf;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on a single upload request body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors that can occur while handling an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A part carried a content type outside the image allow-list.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// The request contained no file parts.
    #[error("no files in upload")]
    NoFiles,

    /// Malformed multipart body.
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Writing the file to disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service that persists uploaded product images to local disk.
#[derive(Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
    base_url: String,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(upload_dir: PathBuf, base_url: String) -> Self {
        Self {
            upload_dir,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Persist every image part of a multipart request.
    ///
    /// Returns the public URLs of the stored files, in request order.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` for non-image parts,
    /// `UploadError::NoFiles` when no file part was present, and I/O or
    /// multipart errors otherwise.
    pub async fn save_images(&self, multipart: &mut Multipart) -> Result<Vec<String>, UploadError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let mut urls = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            // Skip non-file form fields (e.g., alt text the client may send)
            if field.file_name().is_none() {
                continue;
            }

            let content_type = field.content_type().unwrap_or("").to_owned();
            let extension = extension_for(&content_type)
                .ok_or_else(|| UploadError::UnsupportedType(content_type.clone()))?;

            let filename = format!("{}.{extension}", Uuid::new_v4());
            let bytes = field.bytes().await?;

            tokio::fs::write(self.upload_dir.join(&filename), &bytes).await?;
            tracing::info!(filename = %filename, size = bytes.len(), "Stored uploaded image");

            urls.push(format!("{}/uploads/{filename}", self.base_url));
        }

        if urls.is_empty() {
            return Err(UploadError::NoFiles);
        }

        Ok(urls)
    }
}

/// Map an image content type to a file extension.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

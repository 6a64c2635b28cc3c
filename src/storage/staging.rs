use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::core::{RequestError, RequestResult};
use crate::models::{ImageRef, MAX_ATTACHMENTS};

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Error)]
pub enum StagingError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded image held in memory before staging.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Upload {
            filename: filename.into(),
            data,
        }
    }

    /// Decodes a base64 payload, with or without a `data:` URL prefix.
    pub fn from_base64(filename: impl Into<String>, encoded: &str) -> RequestResult<Self> {
        let filename = filename.into();
        let payload = match encoded.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => encoded,
        };

        let data = BASE64
            .decode(payload.trim())
            .map_err(|_| RequestError::InvalidPayload {
                filename: filename.clone(),
            })?;

        Ok(Upload { filename, data })
    }
}

/// Checks one file and returns its lowercased extension.
pub fn validate(filename: &str, size: usize) -> RequestResult<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| RequestError::DisallowedFileType {
            filename: filename.to_string(),
        })?;

    if size > MAX_FILE_SIZE {
        return Err(RequestError::FileTooLarge {
            filename: filename.to_string(),
            size,
            limit: MAX_FILE_SIZE,
        });
    }

    Ok(extension)
}

pub fn validate_all(uploads: &[Upload]) -> RequestResult<()> {
    if uploads.len() > MAX_ATTACHMENTS {
        return Err(RequestError::TooManyFiles {
            count: uploads.len(),
            limit: MAX_ATTACHMENTS,
        });
    }

    for upload in uploads {
        validate(&upload.filename, upload.data.len())?;
    }
    Ok(())
}

/// Temporary upload area shared by all requests.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    dir: PathBuf,
}

impl UploadStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        UploadStaging { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Validates every upload, then writes them under unique names. Nothing
    /// is written if any upload is rejected.
    pub async fn stage(&self, uploads: Vec<Upload>) -> Result<StagedUploads, StagingError> {
        validate_all(&uploads)?;

        let mut staged = StagedUploads::default();
        for upload in uploads {
            let extension = validate(&upload.filename, upload.data.len())?;
            let path = self
                .dir
                .join(format!("work-image-{}.{}", Uuid::new_v4().simple(), extension));

            tokio::fs::write(&path, &upload.data).await?;
            tracing::debug!(file = %path.display(), original = %upload.filename, "Staged upload");
            staged.images.push(ImageRef::new(path, upload.filename));
        }

        Ok(staged)
    }
}

/// Files written by [`UploadStaging::stage`]. Removed by [`cleanup`], or
/// on drop as a fallback.
///
/// [`cleanup`]: StagedUploads::cleanup
#[derive(Debug, Default)]
pub struct StagedUploads {
    images: Vec<ImageRef>,
}

impl StagedUploads {
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub async fn cleanup(mut self) {
        for image in std::mem::take(&mut self.images) {
            if let Err(e) = tokio::fs::remove_file(&image.path).await {
                tracing::warn!(file = %image.path.display(), error = %e, "Error cleaning up file");
            }
        }
    }
}

impl Drop for StagedUploads {
    fn drop(&mut self) {
        for image in &self.images {
            let _ = std::fs::remove_file(&image.path);
        }
    }
}

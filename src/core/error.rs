use std::path::PathBuf;
use thiserror::Error;

/// Rejected input. Raised before any rendering starts.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("line items are not a valid JSON array: {0}")]
    MalformedLineItems(#[from] serde_json::Error),

    #[error("only image files are allowed: {filename}")]
    DisallowedFileType { filename: String },

    #[error("file {filename} exceeds the {limit} byte limit")]
    FileTooLarge { filename: String, size: usize, limit: usize },

    #[error("at most {limit} images per invoice, got {count}")]
    TooManyFiles { count: usize, limit: usize },

    #[error("upload {filename} is not valid base64")]
    InvalidPayload { filename: String },
}

/// The document could not be finalized.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write document stream: {0}")]
    Stream(#[from] std::io::Error),

    #[error("render task aborted: {0}")]
    Aborted(String),
}

/// A single attachment could not be placed. Never aborts a render.
#[derive(Debug, Error)]
pub enum ImagePlacementError {
    #[error("cannot read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type RequestResult<T> = Result<T, RequestError>;
pub type RenderResult<T> = Result<T, RenderError>;

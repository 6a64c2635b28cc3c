pub mod staging;

pub use staging::{StagedUploads, StagingError, Upload, UploadStaging};

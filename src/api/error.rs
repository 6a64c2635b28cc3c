use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;

use crate::core::{RenderError, RequestError};
use crate::storage::StagingError;

/// Message returned for any failure past request validation.
pub const GENERIC_RENDER_FAILURE: &str = "Failed to generate invoice";

#[derive(Debug)]
pub struct ApiError {
    message: String,
    status_code: StatusCode,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        ApiError {
            message: message.into(),
            status_code,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code)
            .json(serde_json::json!({
                "success": false,
                "error": self.message,
            }))
    }

    fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        tracing::error!(error = %err, "Error generating invoice");
        ApiError::internal_server_error(GENERIC_RENDER_FAILURE)
    }
}

impl From<StagingError> for ApiError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::Request(e) => e.into(),
            StagingError::Io(e) => {
                tracing::error!(error = %e, "Error staging uploads");
                ApiError::internal_server_error(GENERIC_RENDER_FAILURE)
            }
        }
    }
}

impl From<actix_web::error::JsonPayloadError> for ApiError {
    fn from(err: actix_web::error::JsonPayloadError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_keep_their_detail() {
        let err: ApiError = RequestError::DisallowedFileType {
            filename: "payload.svg".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("payload.svg"));
    }

    #[test]
    fn render_and_staging_failures_are_generic() {
        let render: ApiError = RenderError::Aborted("worker panicked at /srv/tmp".to_string()).into();
        assert_eq!(render.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(render.message(), GENERIC_RENDER_FAILURE);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/var/uploads");
        let staging: ApiError = StagingError::Io(io).into();
        assert_eq!(staging.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(staging.message(), GENERIC_RENDER_FAILURE);
    }
}

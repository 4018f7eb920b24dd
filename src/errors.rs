//! Error types for the LexPlain service
//!
//! Provides:
//! - Distinct error types for each failure mode the boundary can report
//! - HTTP status code mapping
//! - Structured JSON error responses
//! - Machine-readable error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    PayloadTooLarge,

    // Document errors (2xxx)
    ExtractionFailed,

    // Session errors (4xxx)
    SessionExpired,

    // External service errors (8xxx)
    AnswerProviderFailed,
    TranslationFailed,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::PayloadTooLarge => 1003,

            ErrorCode::ExtractionFailed => 2001,

            ErrorCode::SessionExpired => 4001,

            ErrorCode::AnswerProviderFailed => 8001,
            ErrorCode::TranslationFailed => 8002,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    // Document errors
    #[error("Could not read the document: {message}")]
    ExtractionFailed { message: String },

    // Session errors
    #[error("Session expired or invalid: {id}")]
    SessionExpired { id: String },

    // External service errors
    #[error("Answer service unavailable: {message}")]
    AnswerProvider { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::MissingField { .. } => ErrorCode::MissingField,
            Self::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            Self::ExtractionFailed { .. } => ErrorCode::ExtractionFailed,
            Self::SessionExpired { .. } => ErrorCode::SessionExpired,
            Self::AnswerProvider { .. } => ErrorCode::AnswerProviderFailed,
            Self::Translation { .. } => ErrorCode::TranslationFailed,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Config(_) => ErrorCode::ConfigurationError,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::MissingField { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SessionExpired { .. } => StatusCode::NOT_FOUND,
            Self::AnswerProvider { .. } => StatusCode::BAD_GATEWAY,
            Self::Translation { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short remediation hint surfaced alongside the message
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ExtractionFailed { .. } => {
                Some("The file could not be parsed. Re-save the PDF and try again.")
            }
            Self::SessionExpired { .. } => {
                Some("The document session has expired. Upload the document again.")
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log based on severity
        match &self {
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::PayloadTooLarge { .. }
            | AppError::ExtractionFailed { .. }
            | AppError::SessionExpired { .. } => {
                tracing::debug!(error_code = error_code.as_code(), %message, "Client error");
            }
            _ => {
                tracing::error!(error_code = error_code.as_code(), %message, error = ?self, "Server error");
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "status": status.as_u16(),
                "message": message,
                "hint": self.hint(),
                "details": if cfg!(debug_assertions) {
                    Some(format!("{:?}", self))
                } else {
                    None
                }
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_is_distinct_from_not_found_family() {
        let err = AppError::SessionExpired {
            id: "bogus".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), ErrorCode::SessionExpired);
        assert_eq!(err.error_code().as_code(), 4001);
    }

    #[test]
    fn test_provider_failure_maps_to_bad_gateway() {
        let err = AppError::AnswerProvider {
            message: "all providers exhausted".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_extraction_failure_carries_retry_hint() {
        let err = AppError::ExtractionFailed {
            message: "no text content".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.hint().unwrap().contains("Re-save"));
    }
}

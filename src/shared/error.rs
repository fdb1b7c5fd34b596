//! Application Error Types
//!
//! Centralized error handling. Transports relay [`ErrorResponse`] bodies.

use serde::Serialize;

use crate::domain::services::{EngineError, MoveSourceError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rules engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Move source error: {0}")]
    MoveSource(#[from] MoveSourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// Stable numeric code for this error
    pub fn error_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 10001,
            AppError::Validation(_) => 10007,
            AppError::Engine(_) => 10008,
            AppError::MoveSource(_) => 10009,
            AppError::Config(_) | AppError::Internal(_) => 10000,
        }
    }

    /// Response body for this error. Internal details are logged, not exposed.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::Engine(e) => e.to_string(),
            AppError::MoveSource(e) => {
                tracing::error!("Move source error: {}", e);
                "Move source unavailable".into()
            }
            AppError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                "Internal server error".into()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".into()
            }
        };

        ErrorResponse {
            code: self.error_code(),
            message,
            errors: None,
        }
    }
}

//! Catalog Error Types
//!
//! This module provides catalog-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Errors are `Clone` because one upstream fetch can be awaited by many
//! callers of the cache at once.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::retry::Retryable;
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog-specific error variants
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Transport failure (DNS, connect, reset) or upstream 5xx
    #[error("Network error: {0}")]
    Network(String),

    /// Caller-supplied timeout elapsed
    #[error("Catalog request timed out after {0:?}")]
    Timeout(Duration),

    /// Every configured API key is rate limited
    #[error("Catalog provider rate limit reached")]
    RateLimited,

    /// Response body could not be decoded
    #[error("Malformed catalog response: {0}")]
    Decode(String),

    /// Provider rejected the API key
    #[error("Catalog provider rejected the API key")]
    InvalidApiKey,

    /// Malformed identifier or image reference
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Network(_) | CatalogError::Timeout(_) | CatalogError::RateLimited => {
                ErrorKind::Network
            }
            CatalogError::Decode(_) => ErrorKind::Decode,
            CatalogError::InvalidReference(_) => ErrorKind::InvalidReference,
            CatalogError::InvalidApiKey | CatalogError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self.kind() {
            ErrorKind::Network => err.with_action("Check your connection and try again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CatalogError::Decode(msg) => {
                tracing::error!(message = %msg, "Catalog returned malformed data");
            }
            CatalogError::InvalidApiKey => {
                tracing::error!("Catalog provider rejected the configured API key");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::Network(_) | CatalogError::Timeout(_) | CatalogError::RateLimited => {
                tracing::warn!(error = %self, "Catalog unavailable");
            }
            CatalogError::InvalidReference(_) => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl Retryable for CatalogError {
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else if err.is_builder() {
            CatalogError::Internal(err.to_string())
        } else {
            CatalogError::Network(err.to_string())
        }
    }
}

impl From<AppError> for CatalogError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::InvalidReference => CatalogError::InvalidReference(err.message().to_string()),
            ErrorKind::Decode => CatalogError::Decode(err.message().to_string()),
            ErrorKind::Network => CatalogError::Network(err.message().to_string()),
            _ => CatalogError::Internal(err.to_string()),
        }
    }
}

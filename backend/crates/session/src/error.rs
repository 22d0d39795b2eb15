//! Session Error Types
//!
//! This module provides session-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::retry::Retryable;
use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific error variants
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Provider rejected the credential
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Provider could not be reached or timed out
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Another sign-in is already outstanding
    #[error("A sign-in is already in progress")]
    ConcurrentOperation,

    /// Sign-in was cancelled by a sign-out
    #[error("Sign-in was cancelled")]
    Cancelled,

    /// No signed-in user
    #[error("Not signed in")]
    NotAuthenticated,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidCredentials => ErrorKind::Auth,
            SessionError::ProviderUnavailable(_) => ErrorKind::Network,
            SessionError::ConcurrentOperation | SessionError::Cancelled => {
                ErrorKind::ConcurrentOperation
            }
            SessionError::NotAuthenticated => ErrorKind::NotAuthenticated,
            SessionError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            SessionError::InvalidCredentials => err.with_action("Sign in again"),
            SessionError::ProviderUnavailable(_) => {
                err.with_action("Check your connection and try again")
            }
            SessionError::NotAuthenticated => err.with_action("Sign in to continue"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            SessionError::Internal(msg) => {
                tracing::error!(message = %msg, "Session internal error");
            }
            SessionError::ProviderUnavailable(msg) => {
                tracing::warn!(message = %msg, "Identity provider unavailable");
            }
            SessionError::InvalidCredentials => {
                tracing::warn!("Invalid sign-in attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Session error");
            }
        }
    }
}

impl Retryable for SessionError {
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for SessionError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Auth => SessionError::InvalidCredentials,
            ErrorKind::NotAuthenticated => SessionError::NotAuthenticated,
            ErrorKind::Network => SessionError::ProviderUnavailable(err.message().to_string()),
            _ => SessionError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SessionError::InvalidCredentials.kind(), ErrorKind::Auth);
        assert_eq!(
            SessionError::ProviderUnavailable("timeout".into()).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            SessionError::Cancelled.kind(),
            ErrorKind::ConcurrentOperation
        );
        assert_eq!(
            SessionError::ConcurrentOperation.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            SessionError::NotAuthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_only_provider_outage_retries() {
        assert!(SessionError::ProviderUnavailable("reset".into()).is_retryable());
        assert!(!SessionError::InvalidCredentials.is_retryable());
        assert!(!SessionError::Cancelled.is_retryable());
    }
}

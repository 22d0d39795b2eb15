//! Favorites Error Types
//!
//! This module provides favorites-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::MovieId;
use platform::retry::Retryable;
use thiserror::Error;

/// Favorites-specific result type alias
pub type FavoritesResult<T> = Result<T, FavoritesError>;

/// Favorites-specific error variants
#[derive(Debug, Clone, Error)]
pub enum FavoritesError {
    /// No current session
    #[error("Not signed in")]
    NotAuthenticated,

    /// The catalog has no such movie
    #[error("Movie not found: {0}")]
    MovieNotFound(MovieId),

    /// Remote store or catalog unreachable
    #[error("Network error: {0}")]
    Network(String),

    /// Remote store returned a malformed body
    #[error("Malformed store response: {0}")]
    Decode(String),

    /// Remote store refused the request
    #[error("Favorites store error: {0}")]
    Store(String),

    /// Remote write failed after retries and was rolled back locally
    #[error("Could not sync favorite {movie_id}: {reason}")]
    Sync { movie_id: MovieId, reason: String },

    /// Dropped because the session changed before it was reconciled
    #[error("Discarded: the session changed")]
    Discarded,

    /// Malformed identifier
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FavoritesError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FavoritesError::NotAuthenticated => ErrorKind::NotAuthenticated,
            FavoritesError::MovieNotFound(_) => ErrorKind::NotFound,
            FavoritesError::Network(_) => ErrorKind::Network,
            FavoritesError::Decode(_) => ErrorKind::Decode,
            FavoritesError::Sync { .. } => ErrorKind::Sync,
            FavoritesError::Discarded => ErrorKind::ConcurrentOperation,
            FavoritesError::InvalidReference(_) => ErrorKind::InvalidReference,
            FavoritesError::Store(_) | FavoritesError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            FavoritesError::NotAuthenticated => err.with_action("Sign in to manage favorites"),
            FavoritesError::Sync { .. } => err.with_action("Try again"),
            FavoritesError::Network(_) => err.with_action("Check your connection and try again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            FavoritesError::Internal(msg) | FavoritesError::Store(msg) => {
                tracing::error!(message = %msg, "Favorites error");
            }
            FavoritesError::Decode(msg) => {
                tracing::error!(message = %msg, "Favorites store returned malformed data");
            }
            FavoritesError::Sync { movie_id, reason } => {
                tracing::warn!(movie_id = %movie_id, reason = %reason, "Favorite sync failed");
            }
            FavoritesError::Network(_) => {
                tracing::warn!(error = %self, "Favorites store unavailable");
            }
            _ => {
                tracing::debug!(error = %self, "Favorites error");
            }
        }
    }
}

impl Retryable for FavoritesError {
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl IntoResponse for FavoritesError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for FavoritesError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::InvalidReference => {
                FavoritesError::InvalidReference(err.message().to_string())
            }
            ErrorKind::NotAuthenticated => FavoritesError::NotAuthenticated,
            ErrorKind::Network => FavoritesError::Network(err.message().to_string()),
            ErrorKind::Decode => FavoritesError::Decode(err.message().to_string()),
            _ => FavoritesError::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for FavoritesError {
    fn from(err: CatalogError) -> Self {
        match err.kind() {
            ErrorKind::Network => FavoritesError::Network(err.to_string()),
            ErrorKind::Decode => FavoritesError::Decode(err.to_string()),
            ErrorKind::InvalidReference => FavoritesError::InvalidReference(err.to_string()),
            _ => FavoritesError::Internal(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for FavoritesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FavoritesError::Decode(err.to_string())
        } else if err.is_builder() {
            FavoritesError::Internal(err.to_string())
        } else {
            FavoritesError::Network(err.to_string())
        }
    }
}

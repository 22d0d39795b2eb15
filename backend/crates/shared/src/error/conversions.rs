//! Error conversions
//!
//! Turns [`AppError`] into an RFC 7807 problem document when the `axum`
//! feature is enabled.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "kind": self.kind(),
            "retryable": self.kind().offers_retry(),
            "detail": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_problem_document_status() {
        let response = AppError::invalid_reference("Identifier cannot be empty").into_response();
        assert_eq!(response.status().as_u16(), 400);

        let response = AppError::network("Catalog unreachable").into_response();
        assert_eq!(response.status().as_u16(), 503);
    }
}

//! Request-level error taxonomy.
//!
//! Only authentication failure and rate-limit exceedance are visible to
//! the end user; every other failure inside the admission core is
//! recovered or logged without surfacing.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::security::rate_limit::RateDecision;
use crate::security::store::StoreError;

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("authentication required")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited { decision: RateDecision },
    /// The counter store failed while limiting was active. Treated as a
    /// deny: an unreachable store must not be mistaken for "allowed".
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        match self {
            AdmissionError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Authentication required" })),
            )
                .into_response(),
            AdmissionError::RateLimited { decision } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "success": false,
                        "error": "Rate limit exceeded. Please try again later.",
                        "reset_at_ms": decision.reset_at_ms,
                    })),
                )
                    .into_response();
                let headers = response.headers_mut();
                headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
                headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_at_ms));
                response
            }
            AdmissionError::Store(error) => {
                tracing::error!(error = %error, "Counter store unavailable, denying request");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "success": false,
                        "error": "Rate limit exceeded. Please try again later.",
                    })),
                )
                    .into_response()
            }
            AdmissionError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_response_carries_reset_headers() {
        let response = AdmissionError::RateLimited {
            decision: RateDecision {
                allowed: false,
                remaining: 0,
                reset_at_ms: 1_234,
            },
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(response.headers()["x-ratelimit-reset"], "1234");
    }

    #[test]
    fn test_store_error_presents_as_deny() {
        let response = AdmissionError::Store(StoreError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AdmissionError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

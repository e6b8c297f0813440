//! Admission pipeline middleware.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → classify route (public vs protected)
//!     → protected: resolve principal; 401 challenge on failure (fatal)
//!     → attach RequestContext (principal + client IP)
//!     → downstream handler
//! Outgoing response:
//!     → fixed security headers (every admitted response)
//!     → CORS allow headers (only on exact origin match)
//! ```
//!
//! # Design Decisions
//! - The pipeline mutates headers only; rate limiting and audit logging
//!   happen at the handlers' sensitive call sites, using the principal and
//!   IP resolved here
//! - An authentication failure is the one fatal case: not retried, not
//!   downgraded

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AdmissionError;
use crate::http::server::AppState;
use crate::identity::{self, Principal};
use crate::observability::metrics;
use crate::routing::RouteClass;

/// Per-request context resolved by the pipeline, consumed by handlers.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub principal: Principal,
    pub client_ip: String,
}

pub async fn admission_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let credential = identity::bearer_token(request.headers());
    let resolved = state
        .identity
        .authenticate(credential)
        .map(|id| Principal::Authenticated { id });

    let principal = match (state.classifier.classify(&path), resolved) {
        // Public routes still get a principal when a valid credential is
        // presented, so handlers can attribute audit events.
        (RouteClass::Public, resolved) => resolved.unwrap_or(Principal::Anonymous),
        (RouteClass::Protected, Some(principal)) => principal,
        (RouteClass::Protected, None) => {
            tracing::warn!(
                method = %method,
                path = %path,
                "Rejecting unauthenticated request to protected route"
            );
            metrics::record_auth_challenge();
            let mut response = AdmissionError::Unauthorized.into_response();
            // The challenge never reaches a handler, but it still leaves
            // the gate hardened.
            state.enforcer.apply_security_headers(response.headers_mut());
            metrics::record_request(&method, response.status().as_u16(), start);
            return response;
        }
    };

    let client_ip = identity::resolve_ip(request.headers());
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    request
        .extensions_mut()
        .insert(RequestContext { principal, client_ip });

    let mut response = next.run(request).await;

    state.enforcer.apply_security_headers(response.headers_mut());
    state.enforcer.apply_cors(response.headers_mut(), origin.as_deref());

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

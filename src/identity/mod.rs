//! Caller identity resolution.
//!
//! # Responsibilities
//! - Resolve the client network address from proxy headers
//! - Resolve the authenticated principal from request credentials
//! - Provide the `IdentityProvider` seam for external identity backends
//!
//! # Design Decisions
//! - Header precedence is fixed: `x-forwarded-for` (first entry) beats
//!   `x-real-ip`. Reversing it misattributes rate-limit buckets behind
//!   proxy chains.
//! - Principal ids are opaque strings supplied by the provider; this core
//!   never persists them.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};

/// The identity associated with a request, or its absence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated { id: String },
}

impl Principal {
    /// The principal id, when authenticated.
    pub fn id(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated { id } => Some(id),
        }
    }
}

/// Resolves the client IP from request headers.
///
/// Precedence: first `x-forwarded-for` entry (trimmed), then `x-real-ip`,
/// then the literal `"unknown"`.
pub fn resolve_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Resolves the client user agent, defaulting to `"unknown"`.
pub fn resolve_user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extracts the bearer credential from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Maps a presented credential to a principal id.
///
/// The actual verification protocol lives behind this seam; the admission
/// core only consumes the resulting id.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, credential: Option<&str>) -> Option<String>;
}

/// Provider backed by a static token table from configuration.
pub struct StaticIdentityProvider {
    tokens: HashMap<String, String>,
}

impl StaticIdentityProvider {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn shared(tokens: HashMap<String, String>) -> Arc<Self> {
        Arc::new(Self::new(tokens))
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn authenticate(&self, credential: Option<&str>) -> Option<String> {
        let token = credential?;
        self.tokens.get(token).cloned()
    }
}

//! Security response headers and cross-origin policy.
//!
//! # Responsibilities
//! - Attach fixed hardening headers to every admitted response
//! - Mirror the request origin in CORS allow headers, but only on an exact
//!   match with the configured application URL
//!
//! # Design Decisions
//! - Exact string comparison for origins: no wildcard, no subdomain or
//!   scheme normalization. A mismatch silently omits the CORS headers and
//!   lets the browser's same-origin policy apply.

use axum::http::{HeaderMap, HeaderValue};

/// Hardening headers attached to every admitted response.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
];

const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Applies the fixed header set and the exact-match CORS policy.
#[derive(Clone, Debug)]
pub struct SecurityPolicyEnforcer {
    app_url: String,
}

impl SecurityPolicyEnforcer {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
        }
    }

    pub fn apply_security_headers(&self, headers: &mut HeaderMap) {
        for (name, value) in SECURITY_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }

    /// Mirrors the origin only when it equals the configured app URL.
    pub fn apply_cors(&self, headers: &mut HeaderMap, origin: Option<&str>) {
        let Some(origin) = origin else {
            return;
        };
        if origin != self.app_url {
            return;
        }
        let Ok(origin_value) = HeaderValue::from_str(origin) else {
            return;
        };
        headers.insert("access-control-allow-origin", origin_value);
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            "access-control-allow-headers",
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_headers_applied() {
        let enforcer = SecurityPolicyEnforcer::new("http://localhost:3002");
        let mut headers = HeaderMap::new();
        enforcer.apply_security_headers(&mut headers);

        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-xss-protection"], "1; mode=block");
        assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
        assert_eq!(
            headers["permissions-policy"],
            "geolocation=(), microphone=(), camera=()"
        );
    }

    #[test]
    fn test_cors_exact_match() {
        let enforcer = SecurityPolicyEnforcer::new("http://localhost:3002");
        let mut headers = HeaderMap::new();
        enforcer.apply_cors(&mut headers, Some("http://localhost:3002"));

        assert_eq!(headers["access-control-allow-origin"], "http://localhost:3002");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization"
        );
    }

    #[test]
    fn test_cors_mismatch_is_silent() {
        let enforcer = SecurityPolicyEnforcer::new("http://localhost:3002");

        // Trailing slash, scheme change, and absence are all non-matches.
        for origin in [
            Some("http://localhost:3002/"),
            Some("https://localhost:3002"),
            Some("http://evil.example"),
            None,
        ] {
            let mut headers = HeaderMap::new();
            enforcer.apply_cors(&mut headers, origin);
            assert!(headers.get("access-control-allow-origin").is_none());
            assert!(headers.get("access-control-allow-methods").is_none());
        }
    }
}

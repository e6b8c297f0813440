//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, windows > 0, addresses parse)
//! - Detect conflicting auth tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::GateConfig;

/// One semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "not a valid socket address",
        ));
    }

    if config.cors.app_url.is_empty() {
        errors.push(ValidationError::new("cors.app_url", "must not be empty"));
    }

    for (field, window) in [
        ("rate_limit.global", &config.rate_limit.global),
        ("rate_limit.generation", &config.rate_limit.generation),
    ] {
        if window.limit == 0 {
            errors.push(ValidationError::new(field, "limit must be greater than zero"));
        }
        if window.window_secs == 0 {
            errors.push(ValidationError::new(
                field,
                "window_secs must be greater than zero",
            ));
        }
    }

    if config.rate_limit.store_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "rate_limit.store_timeout_ms",
            "must be greater than zero",
        ));
    }

    if config.audit.queue_depth == 0 {
        errors.push(ValidationError::new(
            "audit.queue_depth",
            "must be greater than zero",
        ));
    }

    if config.audit.endpoint.is_some() && config.audit.api_key.is_empty() {
        errors.push(ValidationError::new(
            "audit.api_key",
            "required when audit.endpoint is set",
        ));
    }

    let mut seen = HashSet::new();
    for entry in &config.auth.tokens {
        if entry.token.is_empty() {
            errors.push(ValidationError::new("auth.tokens", "empty token"));
        }
        if !seen.insert(entry.token.as_str()) {
            errors.push(ValidationError::new("auth.tokens", "duplicate token"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::AuthTokenConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GateConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.rate_limit.global.limit = 0;
        config.audit.queue_depth = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_audit_endpoint_requires_api_key() {
        let mut config = GateConfig::default();
        config.audit.endpoint = Some("https://audit.example.com/insert".to_string());
        config.audit.api_key = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "audit.api_key");
    }

    #[test]
    fn test_duplicate_tokens_rejected() {
        let mut config = GateConfig::default();
        config.auth.tokens = vec![
            AuthTokenConfig {
                token: "t".to_string(),
                principal_id: "a".to_string(),
            },
            AuthTokenConfig {
                token: "t".to_string(),
                principal_id: "b".to_string(),
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
    }
}

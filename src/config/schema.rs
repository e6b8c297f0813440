//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! admission gate. All types derive Serde traits for deserialization from
//! config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::security::rate_limit::RateWindow;

/// Root configuration for the admission gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Shared counter store. Absence disables rate limiting.
    pub redis: RedisConfig,

    /// Durable audit store. Absence disables audit persistence.
    pub audit: AuditConfig,

    /// Sliding-window budgets.
    pub rate_limit: RateLimitConfig,

    /// Static credential table for the identity provider.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Cross-origin policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// The one origin allowed to make cross-origin requests. Compared by
    /// exact string equality against the request's `Origin` header.
    pub app_url: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            app_url: "http://localhost:3002".to_string(),
        }
    }
}

/// Shared counter store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL (e.g., "redis://127.0.0.1/"). When absent, rate
    /// limiting is disabled rather than erroring.
    pub url: Option<String>,
}

/// Durable audit store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// HTTP append endpoint for audit records. When absent, events are
    /// logged locally and dropped.
    pub endpoint: Option<String>,

    /// API key sent with every insert.
    pub api_key: String,

    /// Per-write transport timeout in seconds.
    pub timeout_secs: u64,

    /// Bounded depth of the background write queue.
    pub queue_depth: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: String::new(),
            timeout_secs: 5,
            queue_depth: 256,
        }
    }
}

/// One sliding-window budget.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum events per window.
    pub limit: u32,

    /// Window duration in seconds.
    pub window_secs: u64,
}

impl WindowConfig {
    pub fn window(&self) -> RateWindow {
        RateWindow::new(self.limit, Duration::from_secs(self.window_secs))
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            limit: RateWindow::GLOBAL.limit,
            window_secs: RateWindow::GLOBAL.duration.as_secs(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Per-IP budget applied to every API request.
    pub global: WindowConfig,

    /// Per-user budget applied to generation-triggering actions.
    pub generation: WindowConfig,

    /// Counter store round-trip timeout in milliseconds.
    pub store_timeout_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global: WindowConfig {
                limit: RateWindow::GLOBAL.limit,
                window_secs: RateWindow::GLOBAL.duration.as_secs(),
            },
            generation: WindowConfig {
                limit: RateWindow::GENERATION.limit,
                window_secs: RateWindow::GENERATION.duration.as_secs(),
            },
            store_timeout_ms: 1_000,
        }
    }
}

/// One bearer credential mapped to a principal id.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthTokenConfig {
    pub token: String,
    pub principal_id: String,
}

/// Identity provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<AuthTokenConfig>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_budgets() {
        let config = GateConfig::default();
        assert_eq!(config.rate_limit.global.limit, 100);
        assert_eq!(config.rate_limit.global.window_secs, 900);
        assert_eq!(config.rate_limit.generation.limit, 10);
        assert_eq!(config.rate_limit.generation.window_secs, 3600);
        assert!(config.redis.url.is_none());
        assert!(config.audit.endpoint.is_none());
    }

    #[test]
    fn test_minimal_toml_round_trip() {
        let config: GateConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [cors]
            app_url = "https://app.example.com"

            [redis]
            url = "redis://127.0.0.1/"

            [[auth.tokens]]
            token = "tok-1"
            principal_id = "user-1"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.cors.app_url, "https://app.example.com");
        assert_eq!(config.redis.url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.auth.tokens.len(), 1);
        // Untouched sections fall back to defaults.
        assert_eq!(config.timeouts.request_secs, 30);
    }
}

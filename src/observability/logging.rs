//! Structured logging setup.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Let `RUST_LOG` override the configured default level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("admission_gate={default_level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

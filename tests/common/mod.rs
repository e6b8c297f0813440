//! Shared utilities for integration testing.

use std::sync::Arc;

use admission_gate::audit::AuditRecorder;
use admission_gate::config::schema::AuthTokenConfig;
use admission_gate::config::GateConfig;
use admission_gate::lifecycle::Shutdown;
use admission_gate::security::store::CounterStore;
use admission_gate::HttpServer;

/// A gate instance bound to an ephemeral port.
pub struct TestGate {
    pub base_url: String,
    pub shutdown: Shutdown,
}

/// Start a gate with the given config and collaborators.
pub async fn spawn_gate(
    config: GateConfig,
    counter_store: Option<Arc<CounterStore>>,
    audit: AuditRecorder,
) -> TestGate {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_stores(config, counter_store, audit);
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestGate {
        base_url: format!("http://{}", addr),
        shutdown,
    }
}

/// Config with one known credential; everything else at defaults.
pub fn test_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.auth.tokens.push(AuthTokenConfig {
        token: "tok-alice".into(),
        principal_id: "user-alice".into(),
    });
    config.auth.tokens.push(AuthTokenConfig {
        token: "tok-bob".into(),
        principal_id: "user-bob".into(),
    });
    config
}

/// Non-pooled client so each test drives fresh connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

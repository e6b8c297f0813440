//! HTTP server setup and wiring.
//!
//! # Responsibilities
//! - Resolve external collaborators from config (counter store, audit
//!   store, identity provider); absence of an optional store yields the
//!   corresponding disabled component, never an error
//! - Build the Axum router with the admission middleware stack
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - All client handles are constructed here and injected through
//!   `AppState`; no ambient module-scope connections
//! - The middleware layer wraps the whole router, so even unmatched paths
//!   pass through classification and the fail-closed default

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::audit::store::{AuditError, HttpAuditStore};
use crate::audit::AuditRecorder;
use crate::config::GateConfig;
use crate::http::handlers;
use crate::http::middleware::admission_middleware;
use crate::identity::{IdentityProvider, StaticIdentityProvider};
use crate::routing::RouteClassifier;
use crate::security::rate_limit::{RateScope, SlidingWindowLimiter};
use crate::security::store::{CounterStore, RedisCounterStore, StoreError};
use crate::security::SecurityPolicyEnforcer;

/// Failure to assemble the admission stack from configuration.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Application state injected into middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub classifier: Arc<RouteClassifier>,
    pub enforcer: Arc<SecurityPolicyEnforcer>,
    pub identity: Arc<dyn IdentityProvider>,
    pub global_limiter: Arc<SlidingWindowLimiter>,
    pub generation_limiter: Arc<SlidingWindowLimiter>,
    pub audit: AuditRecorder,
}

/// HTTP server for the admission gate.
pub struct HttpServer {
    router: Router,
    config: Arc<GateConfig>,
}

impl HttpServer {
    /// Builds the full stack from configuration, connecting to the counter
    /// store and audit endpoint when they are configured.
    pub async fn build(config: GateConfig) -> Result<Self, BuildError> {
        let counter_store = match &config.redis.url {
            Some(url) => {
                let store = RedisCounterStore::connect(url).await?;
                tracing::info!("Counter store connected, rate limiting active");
                Some(Arc::new(CounterStore::Redis(store)))
            }
            None => {
                tracing::warn!("No counter store configured, rate limiting disabled");
                None
            }
        };

        let audit = match &config.audit.endpoint {
            Some(endpoint) => {
                let store = HttpAuditStore::new(
                    endpoint,
                    &config.audit.api_key,
                    Duration::from_secs(config.audit.timeout_secs),
                )?;
                tracing::info!("Audit persistence active");
                let (recorder, _worker) = AuditRecorder::spawn(store, config.audit.queue_depth);
                recorder
            }
            None => {
                tracing::warn!("No audit endpoint configured, events will be dropped");
                AuditRecorder::disabled()
            }
        };

        Ok(Self::with_stores(config, counter_store, audit))
    }

    /// Assembles the server from explicit collaborators. The entry point
    /// goes through [`HttpServer::build`]; tests and single-process
    /// deployments inject their own stores here.
    pub fn with_stores(
        config: GateConfig,
        counter_store: Option<Arc<CounterStore>>,
        audit: AuditRecorder,
    ) -> Self {
        let store_timeout = Duration::from_millis(config.rate_limit.store_timeout_ms);
        let (global_limiter, generation_limiter) = match counter_store {
            Some(store) => (
                SlidingWindowLimiter::active(
                    store.clone(),
                    RateScope::Global,
                    config.rate_limit.global.window(),
                    store_timeout,
                ),
                SlidingWindowLimiter::active(
                    store,
                    RateScope::Generation,
                    config.rate_limit.generation.window(),
                    store_timeout,
                ),
            ),
            None => (
                SlidingWindowLimiter::disabled(),
                SlidingWindowLimiter::disabled(),
            ),
        };

        let tokens: HashMap<String, String> = config
            .auth
            .tokens
            .iter()
            .map(|entry| (entry.token.clone(), entry.principal_id.clone()))
            .collect();

        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            classifier: Arc::new(RouteClassifier::with_default_rules()),
            enforcer: Arc::new(SecurityPolicyEnforcer::new(config.cors.app_url.clone())),
            identity: StaticIdentityProvider::shared(tokens),
            global_limiter: Arc::new(global_limiter),
            generation_limiter: Arc::new(generation_limiter),
            audit,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::landing))
            .route("/pricing", get(handlers::pricing))
            .route("/sign-in", get(handlers::sign_in))
            .route("/sign-up", get(handlers::sign_up))
            .route("/health", get(handlers::health))
            .route("/api/user/me", get(handlers::me))
            .route("/api/admin/stats", get(handlers::admin_stats))
            .route("/api/generate", post(handlers::generate))
            .route("/api/webhooks/identity", post(handlers::identity_webhook))
            .route("/api/cron/reset-credits", post(handlers::reset_credits))
            .layer(
                // Outermost first: tracing and request ids wrap the
                // timeout, which wraps the admission pipeline.
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        admission_middleware,
                    )),
            )
            .with_state(state)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

//! Durable append-only audit storage.
//!
//! # Responsibilities
//! - Accept one audit record insert; report failure to the worker only
//!
//! # Design Decisions
//! - One POST per record keeps the endpoint contract trivial (an
//!   append-only table behind a REST insert)
//! - Transport timeouts are bounded so a slow store cannot back the
//!   worker up indefinitely

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use super::AuditEvent;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("audit write rejected: {0}")]
    Rejected(String),
}

/// Append-only sink for audit records.
pub trait AuditStore: Send + Sync + 'static {
    fn insert(&self, event: AuditEvent) -> impl Future<Output = Result<(), AuditError>> + Send;
}

/// Writes records to an HTTP append endpoint.
pub struct HttpAuditStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpAuditStore {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

impl AuditStore for HttpAuditStore {
    async fn insert(&self, event: AuditEvent) -> Result<(), AuditError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&event)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuditError::Rejected(response.status().to_string()));
        }
        Ok(())
    }
}

/// Store for tests and local development; records land in process memory.
#[derive(Clone, Default)]
pub struct InMemoryAuditStore {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit store mutex poisoned").clone()
    }
}

impl AuditStore for InMemoryAuditStore {
    async fn insert(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("audit store mutex poisoned")
            .push(event);
        Ok(())
    }
}

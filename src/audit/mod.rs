//! Best-effort audit logging of sensitive actions.
//!
//! # Data Flow
//! ```text
//! Handler performs a sensitive action:
//!     → AuditRecorder::record (builds the immutable event)
//!     → bounded queue (try_send, never blocks)
//!     → detached worker task
//!     → store.rs (durable append-only write)
//! ```
//!
//! # Design Decisions
//! - Audit logging never fails the triggering action and never sits on its
//!   critical path; the caller's outcome is computed before any write lands
//! - Persistence failures are logged and counted, nothing more
//! - A full queue drops the event: a dropped record is a loss, not a
//!   corruption

pub mod store;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

use crate::identity;
use crate::observability::metrics;
use store::AuditStore;

/// Who performed an audited action.
#[derive(Clone, Debug)]
pub enum AuditActor {
    /// Scheduled tasks and internal maintenance.
    System,
    /// A numeric internal account id.
    Internal(i64),
    /// An identity-provider string id.
    External(String),
}

/// One immutable audit record. Created at the moment of the action and
/// handed to the durable store; never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor_id: Option<i64>,
    pub actor_external_id: Option<String>,
    pub action: String,
    pub ip_address: String,
    pub user_agent: String,
    pub metadata: serde_json::Value,
    pub occurred_at_ms: u64,
}

impl AuditEvent {
    /// Exactly one of the actor columns is set for a known actor; both stay
    /// null for system-initiated actions. Without a request context the
    /// network fields carry the literal `"system"`.
    pub fn new(
        actor: AuditActor,
        action: impl Into<String>,
        metadata: serde_json::Value,
        request_headers: Option<&HeaderMap>,
    ) -> Self {
        let (actor_id, actor_external_id) = match actor {
            AuditActor::System => (None, None),
            AuditActor::Internal(id) => (Some(id), None),
            AuditActor::External(id) => (None, Some(id)),
        };
        let (ip_address, user_agent) = match request_headers {
            Some(headers) => (
                identity::resolve_ip(headers),
                identity::resolve_user_agent(headers),
            ),
            None => ("system".to_string(), "system".to_string()),
        };
        Self {
            actor_id,
            actor_external_id,
            action: action.into(),
            ip_address,
            user_agent,
            metadata,
            occurred_at_ms: unix_time_ms(),
        }
    }
}

/// Handle used by handlers to enqueue audit events.
///
/// Cloning is cheap; the handle only wraps the queue sender. A recorder
/// built with [`AuditRecorder::disabled`] logs events at debug level and
/// drops them.
#[derive(Clone)]
pub struct AuditRecorder {
    tx: Option<mpsc::Sender<AuditEvent>>,
}

impl AuditRecorder {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Spawns the background writer and returns the sending handle.
    ///
    /// The worker drains the queue until every recorder clone is dropped.
    pub fn spawn<S: AuditStore>(
        store: S,
        queue_depth: usize,
    ) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<AuditEvent>(queue_depth.max(1));
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let action = event.action.clone();
                if let Err(error) = store.insert(event).await {
                    tracing::error!(action = %action, error = %error, "Audit write failed");
                    metrics::record_audit_failure();
                }
            }
        });
        (Self { tx: Some(tx) }, handle)
    }

    /// Queues one audit record. Never blocks and never fails the caller: a
    /// full queue or disabled persistence drops the event after logging it.
    pub fn record(
        &self,
        actor: AuditActor,
        action: &str,
        metadata: serde_json::Value,
        request_headers: Option<&HeaderMap>,
    ) {
        let event = AuditEvent::new(actor, action, metadata, request_headers);
        match &self.tx {
            Some(tx) => {
                if tx.try_send(event).is_err() {
                    tracing::warn!(action = %action, "Audit queue full, dropping event");
                    metrics::record_audit_failure();
                }
            }
            None => {
                tracing::debug!(action = %action, "Audit persistence disabled, dropping event");
            }
        }
    }
}

fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::store::InMemoryAuditStore;
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_exactly_one_actor_field() {
        let event = AuditEvent::new(AuditActor::Internal(7), "login", json!({}), None);
        assert_eq!(event.actor_id, Some(7));
        assert_eq!(event.actor_external_id, None);

        let event = AuditEvent::new(
            AuditActor::External("user_abc".to_string()),
            "login",
            json!({}),
            None,
        );
        assert_eq!(event.actor_id, None);
        assert_eq!(event.actor_external_id, Some("user_abc".to_string()));

        let event = AuditEvent::new(AuditActor::System, "cron.tick", json!({}), None);
        assert_eq!(event.actor_id, None);
        assert_eq!(event.actor_external_id, None);
    }

    #[test]
    fn test_system_network_fields_without_request() {
        let event = AuditEvent::new(AuditActor::System, "cron.tick", json!({}), None);
        assert_eq!(event.ip_address, "system");
        assert_eq!(event.user_agent, "system");
    }

    #[test]
    fn test_network_fields_from_request() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, 5.6.7.8"));
        headers.insert("user-agent", HeaderValue::from_static("agent/2"));

        let event = AuditEvent::new(AuditActor::Internal(1), "login", json!({}), Some(&headers));
        assert_eq!(event.ip_address, "1.2.3.4");
        assert_eq!(event.user_agent, "agent/2");
    }

    #[test]
    fn test_disabled_recorder_swallows_events() {
        let recorder = AuditRecorder::disabled();
        recorder.record(AuditActor::System, "noop", json!({}), None);
    }

    #[tokio::test]
    async fn test_worker_drains_queue() {
        let store = InMemoryAuditStore::new();
        let (recorder, handle) = AuditRecorder::spawn(store.clone(), 16);

        recorder.record(AuditActor::Internal(1), "a", json!({"k": 1}), None);
        recorder.record(AuditActor::System, "b", json!({}), None);

        drop(recorder);
        handle.await.unwrap();

        let events = store.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "a");
        assert_eq!(events[1].action, "b");
    }
}

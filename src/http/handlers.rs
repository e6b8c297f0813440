//! Request handlers for the application surface.
//!
//! Handlers own the sensitive call sites: the per-IP global budget on API
//! routes, the per-user generation quota, and the audit records for
//! quota-bound and system-initiated actions.

use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::audit::AuditActor;
use crate::error::AdmissionError;
use crate::http::middleware::RequestContext;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::rate_limit::RateScope;

/// Workflow kinds accepted by the generation endpoint. Closed set: an
/// unknown kind fails deserialization before reaching the handler.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    SocialMedia,
    GithubReadme,
    LinkedinPost,
    ResumeBullets,
    StudyNotes,
}

impl WorkflowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowKind::SocialMedia => "social_media",
            WorkflowKind::GithubReadme => "github_readme",
            WorkflowKind::LinkedinPost => "linkedin_post",
            WorkflowKind::ResumeBullets => "resume_bullets",
            WorkflowKind::StudyNotes => "study_notes",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub source_url: String,
    pub workflow: WorkflowKind,
}

const MAX_SOURCE_URL_LEN: usize = 2048;

/// Counts one request against the global per-IP budget.
///
/// A disabled limiter means limiting is intentionally off and the request
/// passes; an active limiter that cannot reach its store denies.
async fn enforce_global_limit(state: &AppState, client_ip: &str) -> Result<(), AdmissionError> {
    let Some(limiter) = state.global_limiter.as_active() else {
        return Ok(());
    };
    let decision = limiter.check(client_ip).await?;
    if !decision.allowed {
        metrics::record_rate_limited(RateScope::Global.as_str());
        return Err(AdmissionError::RateLimited { decision });
    }
    Ok(())
}

pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Value>, AdmissionError> {
    enforce_global_limit(&state, &ctx.client_ip).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "principal": ctx.principal.id() },
    })))
}

pub async fn admin_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Value>, AdmissionError> {
    enforce_global_limit(&state, &ctx.client_ip).await?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "rate_limiting_active": state.global_limiter.is_active(),
            "global": {
                "limit": state.config.rate_limit.global.limit,
                "window_secs": state.config.rate_limit.global.window_secs,
            },
            "generation": {
                "limit": state.config.rate_limit.generation.limit,
                "window_secs": state.config.rate_limit.generation.window_secs,
            },
        },
    })))
}

/// The quota-bound action: admits a generation request, records it for
/// security review, and hands it to the (external) generation backend.
pub async fn generate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<Value>, AdmissionError> {
    enforce_global_limit(&state, &ctx.client_ip).await?;

    // The pipeline guarantees a principal on protected routes.
    let Some(user_id) = ctx.principal.id() else {
        return Err(AdmissionError::Unauthorized);
    };

    if body.source_url.len() > MAX_SOURCE_URL_LEN
        || !(body.source_url.starts_with("http://") || body.source_url.starts_with("https://"))
    {
        return Err(AdmissionError::BadRequest("Invalid source URL".to_string()));
    }

    let mut quota_remaining = None;
    if let Some(limiter) = state.generation_limiter.as_active() {
        let decision = limiter.check(user_id).await?;
        if !decision.allowed {
            tracing::warn!(user = %user_id, "Generation quota exhausted");
            metrics::record_rate_limited(RateScope::Generation.as_str());
            return Err(AdmissionError::RateLimited { decision });
        }
        quota_remaining = Some(decision.remaining);
    }

    state.audit.record(
        AuditActor::External(user_id.to_string()),
        "generation.requested",
        json!({
            "workflow": body.workflow.as_str(),
            "source_url": body.source_url,
        }),
        Some(&headers),
    );

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "accepted",
            "workflow": body.workflow.as_str(),
            "quota_remaining": quota_remaining,
        },
    })))
}

/// Identity-provider webhook. Public route; the provider is the caller,
/// so the record carries a system actor with the request's network fields.
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let event_type = payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    state.audit.record(
        AuditActor::System,
        "webhook.identity",
        json!({ "type": event_type }),
        Some(&headers),
    );
    Json(json!({ "success": true }))
}

/// Scheduled task endpoint. No request context on the audit record: both
/// network fields carry the literal "system".
pub async fn reset_credits(State(state): State<AppState>) -> Json<Value> {
    state
        .audit
        .record(AuditActor::System, "cron.reset_credits", json!({}), None);
    Json(json!({ "success": true, "data": { "status": "scheduled" } }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// Marketing pages are rendered elsewhere; these stubs exist so the public
// routes resolve inside the gate.

pub async fn landing() -> Json<Value> {
    Json(json!({ "page": "landing" }))
}

pub async fn pricing() -> Json<Value> {
    Json(json!({ "page": "pricing" }))
}

pub async fn sign_in() -> Json<Value> {
    Json(json!({ "page": "sign-in" }))
}

pub async fn sign_up() -> Json<Value> {
    Json(json!({ "page": "sign-up" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_kind_is_a_closed_set() {
        let parsed: WorkflowKind = serde_json::from_str(r#""social_media""#).unwrap();
        assert_eq!(parsed, WorkflowKind::SocialMedia);

        let rejected: Result<WorkflowKind, _> = serde_json::from_str(r#""malicious_workflow""#);
        assert!(rejected.is_err());
    }
}

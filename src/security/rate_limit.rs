//! Sliding-window rate limiting over a shared counter store.
//!
//! # Responsibilities
//! - Enforce "N events per window per key" for the two fixed budgets:
//!   global per-IP and per-user generation quota
//! - Make "not configured" a distinct, testable state from "store down"
//!
//! # Design Decisions
//! - `SlidingWindowLimiter::Disabled` has no `check`: callers obtain an
//!   `ActiveLimiter` via `as_active()` first, so a disabled limiter can
//!   never be consulted by accident (fail-open by configuration absence)
//! - A store error while active surfaces to the caller, who must treat it
//!   as a deny (fail-closed); it is never downgraded to "allowed"
//! - Store round trips are bounded by a timeout so a slow store cannot
//!   stall the request pipeline

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::security::store::{CounterStore, StoreError};

/// Which budget a gated operation draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RateScope {
    /// Every API request, keyed by client IP.
    Global,
    /// Generation-triggering actions, keyed by principal id.
    Generation,
}

impl RateScope {
    pub fn key_prefix(self) -> &'static str {
        match self {
            RateScope::Global => "ratelimit:global",
            RateScope::Generation => "ratelimit:gen",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RateScope::Global => "global",
            RateScope::Generation => "generation",
        }
    }
}

/// Composite key identifying one budget bucket in the counter store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub scope: RateScope,
    pub subject: String,
}

impl RateLimitKey {
    pub fn new(scope: RateScope, subject: impl Into<String>) -> Self {
        Self {
            scope,
            subject: subject.into(),
        }
    }

    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.scope.key_prefix(), self.subject)
    }
}

/// Immutable budget configuration: `limit` events per `duration`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateWindow {
    pub limit: u32,
    pub duration: Duration,
}

impl RateWindow {
    /// 100 requests per 15 minutes per IP.
    pub const GLOBAL: RateWindow = RateWindow {
        limit: 100,
        duration: Duration::from_secs(15 * 60),
    };

    /// 10 generations per hour per user.
    pub const GENERATION: RateWindow = RateWindow {
        limit: 10,
        duration: Duration::from_secs(60 * 60),
    };

    pub fn new(limit: u32, duration: Duration) -> Self {
        Self { limit, duration }
    }
}

/// Outcome of one limiter check. Produced fresh per call, never cached.
#[derive(Clone, Copy, Debug)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Unix milliseconds at which the window frees a slot.
    pub reset_at_ms: u64,
}

/// A limiter that is either intentionally off or bound to a counter store.
pub enum SlidingWindowLimiter {
    /// No counter store configured; callers skip the check entirely.
    Disabled,
    Active(ActiveLimiter),
}

impl SlidingWindowLimiter {
    pub fn disabled() -> Self {
        SlidingWindowLimiter::Disabled
    }

    pub fn active(
        store: Arc<CounterStore>,
        scope: RateScope,
        window: RateWindow,
        store_timeout: Duration,
    ) -> Self {
        SlidingWindowLimiter::Active(ActiveLimiter {
            store,
            scope,
            window,
            store_timeout,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SlidingWindowLimiter::Active(_))
    }

    /// The checkable limiter, when one is configured.
    pub fn as_active(&self) -> Option<&ActiveLimiter> {
        match self {
            SlidingWindowLimiter::Disabled => None,
            SlidingWindowLimiter::Active(limiter) => Some(limiter),
        }
    }
}

/// A limiter bound to a counter store; only this type can be checked.
pub struct ActiveLimiter {
    store: Arc<CounterStore>,
    scope: RateScope,
    window: RateWindow,
    store_timeout: Duration,
}

impl ActiveLimiter {
    /// Counts one event against `subject`'s budget.
    ///
    /// An error means the event could not be counted; the caller must
    /// treat it as a deny to preserve the abuse-prevention guarantee.
    pub async fn check(&self, subject: &str) -> Result<RateDecision, StoreError> {
        let key = RateLimitKey::new(self.scope, subject);
        let now_ms = unix_time_ms();
        let storage_key = key.storage_key();
        let hit = self
            .store
            .hit(&storage_key, self.window.limit, self.window.duration, now_ms);
        match tokio::time::timeout(self.store_timeout, hit).await {
            Ok(decision) => decision,
            Err(_) => Err(StoreError::Timeout),
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
    use super::*;

    fn active(limit: u32) -> SlidingWindowLimiter {
        SlidingWindowLimiter::active(
            Arc::new(CounterStore::memory()),
            RateScope::Generation,
            RateWindow::new(limit, Duration::from_secs(3600)),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_disabled_limiter_is_never_checkable() {
        let limiter = SlidingWindowLimiter::disabled();
        assert!(!limiter.is_active());
        assert!(limiter.as_active().is_none());
    }

    #[test]
    fn test_storage_key_format() {
        let key = RateLimitKey::new(RateScope::Global, "1.2.3.4");
        assert_eq!(key.storage_key(), "ratelimit:global:1.2.3.4");

        let key = RateLimitKey::new(RateScope::Generation, "user-7");
        assert_eq!(key.storage_key(), "ratelimit:gen:user-7");
    }

    #[tokio::test]
    async fn test_budget_exhausts_then_denies() {
        let limiter = active(10);
        let limiter = limiter.as_active().unwrap();

        for expected in (0..10).rev() {
            let decision = limiter.check("user-1").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected);
        }

        let decision = limiter.check("user-1").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert!(decision.reset_at_ms > 0);
    }

    #[tokio::test]
    async fn test_subjects_do_not_share_budget() {
        let limiter = active(1);
        let limiter = limiter.as_active().unwrap();

        assert!(limiter.check("user-1").await.unwrap().allowed);
        assert!(!limiter.check("user-1").await.unwrap().allowed);
        assert!(limiter.check("user-2").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_scopes_do_not_share_budget() {
        let store = Arc::new(CounterStore::memory());
        let global = SlidingWindowLimiter::active(
            store.clone(),
            RateScope::Global,
            RateWindow::new(1, Duration::from_secs(3600)),
            Duration::from_secs(1),
        );
        let generation = SlidingWindowLimiter::active(
            store,
            RateScope::Generation,
            RateWindow::new(1, Duration::from_secs(3600)),
            Duration::from_secs(1),
        );

        assert!(global.as_active().unwrap().check("x").await.unwrap().allowed);
        assert!(!global.as_active().unwrap().check("x").await.unwrap().allowed);
        // Same subject, different scope: a separate bucket.
        assert!(generation.as_active().unwrap().check("x").await.unwrap().allowed);
    }
}

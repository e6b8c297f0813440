//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted request:
//!     → rate_limit.rs (sliding-window budgets per IP / per principal)
//!     → store.rs (shared counter state, Redis or in-memory)
//! Outgoing response:
//!     → headers.rs (fixed security headers, exact-match CORS)
//! ```
//!
//! # Design Decisions
//! - The counter store is the single source of truth; no cross-call
//!   caching of counts in process memory
//! - Missing store configuration disables limiting (fail-open by intent);
//!   a store error while active denies (fail-closed)
//! - No trust in client input

pub mod headers;
pub mod rate_limit;
pub mod store;

pub use headers::SecurityPolicyEnforcer;
pub use rate_limit::{ActiveLimiter, RateDecision, RateScope, RateWindow, SlidingWindowLimiter};
pub use store::{CounterStore, InMemoryCounterStore, RedisCounterStore, StoreError};

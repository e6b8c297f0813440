//! Route classification subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (evaluate ordered public-route rules)
//!     → Return: Public or Protected
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - First match wins (order-sensitive)
//! - No match defaults to Protected: new routes stay locked down until
//!   explicitly allow-listed
//! - Glob wildcard only as a trailing segment; no regex in the hot path

pub mod classifier;

pub use classifier::{RouteClass, RouteClassifier, RouteRule};

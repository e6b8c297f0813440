//! Request Admission Gate
//!
//! An HTTP admission layer that fronts an application surface and decides,
//! per request, whether the caller gets through.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │               ADMISSION GATE                  │
//!                      │                                               │
//!   Client Request     │  ┌─────────┐   ┌────────────┐   ┌─────────┐  │
//!   ──────────────────▶│  │  http   │──▶│ routing    │──▶│identity │  │
//!                      │  │ server  │   │ classifier │   │ resolve │  │
//!                      │  └─────────┘   └────────────┘   └────┬────┘  │
//!                      │                                      │       │
//!                      │                                      ▼       │
//!                      │                              ┌────────────┐  │
//!                      │                              │  security  │  │
//!                      │                              │ rate limit │◀─┼── counter store
//!                      │                              └─────┬──────┘  │
//!                      │                                    │         │
//!   Client Response    │  ┌──────────┐   ┌──────────┐  ┌────▼─────┐  │
//!   ◀──────────────────┼──│ headers  │◀──│ handlers │◀─│  audit   │──┼─▶ audit store
//!                      │  │  + CORS  │   │          │  │ recorder │  │
//!                      │  └──────────┘   └──────────┘  └──────────┘  │
//!                      │                                               │
//!                      │  ┌─────────────────────────────────────────┐ │
//!                      │  │          Cross-Cutting Concerns          │ │
//!                      │  │  ┌────────┐ ┌─────────────┐ ┌─────────┐ │ │
//!                      │  │  │ config │ │observability│ │lifecycle│ │ │
//!                      │  │  └────────┘ └─────────────┘ └─────────┘ │ │
//!                      │  └─────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Unmatched and protected routes without a valid credential are
//!   rejected with a 401 challenge (fail closed)
//! - Budget checks are atomic against the shared counter store; a store
//!   failure denies rather than admits
//! - Audit recording never delays or fails the recorded action

// Core subsystems
pub mod config;
pub mod http;
pub mod identity;
pub mod routing;
pub mod security;

// Sensitive-action bookkeeping
pub mod audit;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

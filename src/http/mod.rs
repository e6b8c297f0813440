//! HTTP surface of the admission gate.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, shared state)
//!     → middleware/admission.rs (classify, auth gate, headers, CORS)
//!     → handlers.rs (rate-limit gates, audit call sites, responses)
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};

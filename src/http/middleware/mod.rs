//! Middleware layers applied to every request.

pub mod admission;

pub use admission::{admission_middleware, RequestContext};

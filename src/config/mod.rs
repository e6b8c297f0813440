//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, all errors collected)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so a minimal config works
//! - Optional external stores are modeled as `Option`: absence is a
//!   reachable state, not an error

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GateConfig;

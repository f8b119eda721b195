//! Postermill Common Utilities
//!
//! Shared infrastructure for all Postermill crates:
//! - Error types and result aliases
//! - Job clock (the `{date}`/`{time}` stamp frozen at batch start)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;

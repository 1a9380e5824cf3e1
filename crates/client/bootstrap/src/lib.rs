//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, catalog loading and session assembly that
//! can be reused by the CLI or any other front-end crate.
pub mod builder;
pub mod config;

pub use builder::{SessionBuilder, SessionSetup};
pub use config::ClientConfig;
pub use runtime::RuntimeConfig;

//! Public session API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the controller can stay focused on orchestration.

pub mod errors;
pub mod outcome;

pub use errors::{Result, SessionError, ValidationError};
pub use outcome::{CommandOutcome, ResumeReport};

//! Game session runtime for the Cypher guessing game.
//!
//! The runtime turns the contract surface from `client-blockchain-core` into a
//! single observable session per connected player. Consumers embed a
//! [`SessionController`], issue commands, and watch the merged
//! [`SessionView`] plus user-facing notices.
//!
//! Modules are organized by responsibility:
//! - [`controller`] hosts the command and reconciliation logic
//! - [`state`] holds the snapshot, optimistic deltas and guess log
//! - [`api`] exposes the error and outcome types clients interact with
//! - [`events`] provides the topic-based notice bus
//! - [`config`] loads runtime tuning from the environment
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod controller;
pub mod events;
pub mod state;

mod workers;

pub use api::{CommandOutcome, Result, ResumeReport, SessionError, ValidationError};
pub use config::RuntimeConfig;
pub use controller::{EventRoute, SessionController};
pub use events::{
    Event, EventBus, Notice, NoticeKind, NoticeLevel, Topic, TransactionEvent, TxAction, TxStage,
};
pub use state::{BlockingCondition, GuessPhase, GuessRecord, SessionView};
pub use workers::EventListener;

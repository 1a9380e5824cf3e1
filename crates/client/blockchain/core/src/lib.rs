//! Contract abstraction layer for the Cypher client.
//!
//! This crate provides a layered abstraction over the daily round contract.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: GameContract (composite trait)
//!          ├── RoundReader
//!          ├── GameActions
//!          ├── ConfirmationWatcher
//!          └── EventSource
//!
//! Layer 1: Domain Traits (rounds, guesses, rewards)
//!
//! Layer 0: BlockchainTransport (pure infrastructure)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{GameContract, RoundReader, GameActions};
//!
//! async fn play(contract: &dyn GameContract, player: Address) {
//!     let tx = contract.approve_and_start(player, stake).await?;
//!     contract.wait_for_confirmation(&tx).await?;
//!     contract.submit_guess(player, "Jesse Pollak").await?;
//! }
//! ```

pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export all traits
pub use traits::{
    BlockchainTransport, ConfirmationWatcher, ContractError, EventSource, GameActions,
    GameContract, RoundReader, TransportError,
};

// Re-export all types
pub use types::{
    Address, CallRequest, ContractEvent, LogEntry, LogFilter, PlayerRecord, RoundId,
    TransactionStatus, TxHash,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_CHAIN_ID, MockGameContract, RecordedCall};

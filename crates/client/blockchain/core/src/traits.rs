//! Contract abstraction traits.
//!
//! This module defines a layered abstraction:
//! - Layer 0: BlockchainTransport (pure infrastructure)
//! - Layer 1: RoundReader, GameActions, ConfirmationWatcher, EventSource (game domain)
//! - Layer 2: GameContract (composite trait)

use std::time::Duration;

use async_trait::async_trait;
use game_core::TokenAmount;
use tokio::sync::broadcast;

use crate::types::{
    Address, CallRequest, ContractEvent, LogEntry, LogFilter, PlayerRecord, RoundId,
    TransactionStatus, TxHash,
};

// ============================================================================
// Error Types
// ============================================================================

/// Transport layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    /// The endpoint or wallet does not implement the requested method.
    #[error("Unsupported method: {0}")]
    Unsupported(String),

    /// The wallet owner declined the request.
    #[error("Request rejected by wallet: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TransportError {
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED_CODE: i64 = 4001;
    /// EIP-1193 "unsupported method" / JSON-RPC "method not found".
    pub const UNSUPPORTED_CODES: [i64; 2] = [4200, -32601];

    /// Classify a JSON-RPC error object.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == Self::USER_REJECTED_CODE {
            TransportError::Rejected(message)
        } else if Self::UNSUPPORTED_CODES.contains(&code) {
            TransportError::Unsupported(message)
        } else {
            TransportError::RpcError { code, message }
        }
    }
}

/// Contract interaction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Execution reverted (either at simulation or on-chain).
    #[error("Contract reverted: {0}")]
    Reverted(String),

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Failed to decode contract data: {0}")]
    Decode(String),

    /// A bounded wait ran out; the transaction may still land.
    #[error("Timed out waiting for {0}")]
    TimedOut(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ContractError {
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ContractError::Rejected(_) | ContractError::Transport(TransportError::Rejected(_))
        )
    }
}

// ============================================================================
// Layer 0: Pure Infrastructure
// ============================================================================

/// Pure blockchain infrastructure layer.
///
/// This trait provides low-level chain operations without any game-specific knowledge.
#[async_trait]
pub trait BlockchainTransport: Send + Sync {
    /// Chain identifier the endpoint (or wallet) is connected to.
    async fn chain_id(&self) -> Result<u64, TransportError>;

    /// Execute a read-only call and return the raw return data.
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, TransportError>;

    /// Sign and broadcast a single transaction from `from`.
    async fn send_transaction(
        &self,
        from: Address,
        request: &CallRequest,
    ) -> Result<TxHash, TransportError>;

    /// Submit several calls as one atomic wallet bundle; returns the bundle id.
    async fn send_calls(
        &self,
        from: Address,
        chain_id: u64,
        calls: &[CallRequest],
    ) -> Result<TxHash, TransportError>;

    /// Status of a transaction submitted via [`Self::send_transaction`].
    async fn query_transaction(&self, tx: &TxHash) -> Result<TransactionStatus, TransportError>;

    /// Status of a bundle submitted via [`Self::send_calls`].
    async fn query_calls(&self, bundle: &TxHash) -> Result<TransactionStatus, TransportError>;

    async fn block_number(&self) -> Result<u64, TransportError>;

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, TransportError>;

    /// Health check: verify connection to the chain.
    async fn health_check(&self) -> Result<(), TransportError> {
        self.chain_id().await.map(|_| ())
    }
}

// ============================================================================
// Layer 1: Game Domain Traits
// ============================================================================

/// Read access to round and player state.
#[async_trait]
pub trait RoundReader: Send + Sync {
    async fn current_round(&self) -> Result<RoundId, ContractError>;

    async fn player_record(
        &self,
        round: RoundId,
        player: Address,
    ) -> Result<PlayerRecord, ContractError>;

    async fn is_finalized(&self, round: RoundId) -> Result<bool, ContractError>;

    /// Unclaimed winnings for `player` in `round` (zero once claimed).
    async fn winnings(&self, round: RoundId, player: Address) -> Result<TokenAmount, ContractError>;

    /// Chain the contract client currently talks to.
    async fn chain_id(&self) -> Result<u64, ContractError>;
}

/// State-changing game calls. Each returns once the wallet has accepted the
/// submission; inclusion is observed through [`ConfirmationWatcher`].
#[async_trait]
pub trait GameActions: Send + Sync {
    /// Approve the stake and start the current round, batched when possible.
    async fn approve_and_start(
        &self,
        player: Address,
        amount: TokenAmount,
    ) -> Result<TxHash, ContractError>;

    /// Submit a guess by profile name.
    async fn submit_guess(&self, player: Address, guess: &str) -> Result<TxHash, ContractError>;

    async fn claim_reward(&self, player: Address, round: RoundId) -> Result<TxHash, ContractError>;
}

/// Transaction inclusion tracking.
#[async_trait]
pub trait ConfirmationWatcher: Send + Sync {
    async fn transaction_status(&self, tx: &TxHash) -> Result<TransactionStatus, ContractError>;

    /// Interval between status polls in [`Self::wait_for_confirmation`].
    fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(1500)
    }

    /// Wait until `tx` leaves the pending state. Never times out on its own;
    /// callers bound it.
    async fn wait_for_confirmation(&self, tx: &TxHash) -> Result<TransactionStatus, ContractError> {
        loop {
            let status = self.transaction_status(tx).await?;
            if !status.is_pending() {
                return Ok(status);
            }
            tokio::time::sleep(self.confirmation_poll_interval()).await;
        }
    }
}

/// Live stream of contract events.
pub trait EventSource: Send + Sync {
    fn subscribe_events(&self) -> broadcast::Receiver<ContractEvent>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Complete game contract interface.
///
/// This is a composite of required domain traits.
pub trait GameContract:
    RoundReader + GameActions + ConfirmationWatcher + EventSource + Send + Sync
{
    /// Get the backend name (e.g., "EVM", "Mock").
    fn name(&self) -> &str;

    /// Get the network name (e.g., "base-sepolia", "local").
    fn network(&self) -> &str;
}

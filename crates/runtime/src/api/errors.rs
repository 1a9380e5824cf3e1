//! Unified error types surfaced by the session API.
//!
//! Wraps local validation failures, wallet refusals and contract failures so
//! clients can bubble them up with consistent context.
use thiserror::Error;

use client_blockchain_core::ContractError;
use game_core::AmountError;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Local, pre-submission failures. No network call has been made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid stake amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("current round has not been loaded yet")]
    RoundNotLoaded,

    #[error("a game has already been started this round")]
    GameAlreadyStarted,

    #[error("round is not finalized yet")]
    NotFinalized,

    #[error("no profile selected")]
    MissingSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("wallet refused the request: {0}")]
    Wallet(String),

    #[error("wallet is not connected")]
    WalletDisconnected,

    #[error(transparent)]
    Contract(ContractError),

    #[error("wrong network: expected chain {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("{0} already in progress")]
    CommandInFlight(&'static str),
}

impl From<ContractError> for SessionError {
    fn from(error: ContractError) -> Self {
        if error.is_rejection() {
            SessionError::Wallet(error.to_string())
        } else {
            SessionError::Contract(error)
        }
    }
}

impl SessionError {
    /// Failed before anything was sent to the chain.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_)
                | SessionError::WalletDisconnected
                | SessionError::WrongNetwork { .. }
                | SessionError::CommandInFlight(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::TransportError;

    #[test]
    fn wallet_rejections_are_not_contract_errors() {
        let error = SessionError::from(ContractError::Transport(TransportError::Rejected(
            "user denied".into(),
        )));
        assert!(matches!(error, SessionError::Wallet(_)));

        let error = SessionError::from(ContractError::Reverted("no active game".into()));
        assert!(matches!(error, SessionError::Contract(_)));
        assert!(!error.is_local());
    }

    #[test]
    fn amount_errors_surface_as_validation() {
        let error = SessionError::from(ValidationError::from(AmountError::NotPositive));
        assert!(error.is_local());
        assert_eq!(error.to_string(), "invalid stake amount: amount must be positive");
    }
}

//! Authoritative contract state as of the last completed fetch.

use client_blockchain_core::{PlayerRecord, RoundId};
use game_core::{PlayerStatus, TokenAmount};

/// Last canonical read of the contract for the connected player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// `None` until the first successful round read.
    pub round: Option<RoundId>,
    pub record: PlayerRecord,
    pub is_finalized: bool,
    pub winnings: TokenAmount,
}

impl Snapshot {
    pub fn status(&self) -> PlayerStatus {
        self.record.status()
    }

    /// Contract attempts, saturated into `u32`.
    pub fn attempts(&self) -> u32 {
        u32::try_from(self.record.attempts).unwrap_or(u32::MAX)
    }
}

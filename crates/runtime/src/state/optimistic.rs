//! Pending deltas layered over the authoritative snapshot.
//!
//! Each accepted write pushes one [`PendingOp`]. [`OptimisticLayer::merge`]
//! projects the deltas over a snapshot; [`OptimisticLayer::absorb`] drops the
//! ones the snapshot already reflects, so canonical state always wins.

use client_blockchain_core::TxHash;
use game_core::{GameConfig, PlayerStatus, TokenAmount};

use super::Snapshot;

/// Identifies one accepted command for later settlement or rollback.
pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Start,
    /// 1-based attempt number this guess will occupy
    Guess { attempt: u32 },
    Claim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    pub ticket: Ticket,
    pub tx: TxHash,
    pub kind: PendingKind,
}

/// Session fields covered by pending deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merged {
    pub status: PlayerStatus,
    pub attempts: u32,
    pub winnings: TokenAmount,
}

/// Ordered list of pending deltas.
#[derive(Debug, Clone, Default)]
pub struct OptimisticLayer {
    ops: Vec<PendingOp>,
}

impl OptimisticLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: PendingOp) {
        self.ops.push(op);
    }

    /// Remove a delta. Later pending guesses shift down one attempt so the
    /// remaining ones stay contiguous.
    pub fn remove(&mut self, ticket: Ticket) -> Option<PendingOp> {
        let index = self.ops.iter().position(|op| op.ticket == ticket)?;
        let removed = self.ops.remove(index);

        if let PendingKind::Guess { attempt: gone } = removed.kind {
            for op in &mut self.ops {
                if let PendingKind::Guess { attempt } = &mut op.kind
                    && *attempt > gone
                {
                    *attempt -= 1;
                }
            }
        }

        Some(removed)
    }

    /// Drop a delta whose transaction confirmed. Unlike [`Self::remove`] the
    /// remaining guesses keep their attempt numbers.
    pub fn retire(&mut self, ticket: Ticket) -> Option<PendingOp> {
        let index = self.ops.iter().position(|op| op.ticket == ticket)?;
        Some(self.ops.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingOp> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Project pending deltas over `snapshot`.
    pub fn merge(&self, snapshot: &Snapshot) -> Merged {
        let mut merged = Merged {
            status: snapshot.status(),
            attempts: snapshot.attempts(),
            winnings: snapshot.winnings,
        };

        for op in &self.ops {
            match op.kind {
                PendingKind::Start => {
                    if merged.status == PlayerStatus::Empty {
                        merged.status = PlayerStatus::Active;
                        merged.attempts = 0;
                    }
                }
                PendingKind::Guess { attempt } => {
                    merged.attempts = merged.attempts.max(attempt);
                }
                PendingKind::Claim => merged.winnings = TokenAmount::ZERO,
            }
        }

        merged.attempts = merged.attempts.min(GameConfig::MAX_ATTEMPTS);
        merged
    }

    /// Drop every delta `snapshot` already reflects; returns their tickets.
    pub fn absorb(&mut self, snapshot: &Snapshot) -> Vec<Ticket> {
        let status = snapshot.status();
        let attempts = snapshot.attempts();
        let mut absorbed = Vec::new();

        self.ops.retain(|op| {
            let reflected = match op.kind {
                PendingKind::Start => status != PlayerStatus::Empty,
                PendingKind::Guess { attempt } => attempts >= attempt || status.is_terminal(),
                PendingKind::Claim => snapshot.winnings.is_zero(),
            };
            if reflected {
                absorbed.push(op.ticket);
            }
            !reflected
        });

        absorbed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(ticket: Ticket, kind: PendingKind) -> PendingOp {
        PendingOp {
            ticket,
            tx: TxHash::from_bytes(vec![ticket as u8]),
            kind,
        }
    }

    fn snapshot(status: PlayerStatus, attempts: u64, winnings: u128) -> Snapshot {
        let mut snapshot = Snapshot {
            round: Some(1),
            winnings: TokenAmount(winnings),
            ..Snapshot::default()
        };
        snapshot.record.status_code = status.code();
        snapshot.record.attempts = attempts;
        snapshot
    }

    #[test]
    fn start_delta_activates_until_snapshot_catches_up() {
        let mut layer = OptimisticLayer::new();
        layer.push(op(1, PendingKind::Start));

        let empty = snapshot(PlayerStatus::Empty, 0, 0);
        assert_eq!(layer.merge(&empty).status, PlayerStatus::Active);
        assert!(layer.absorb(&empty).is_empty());

        let active = snapshot(PlayerStatus::Active, 0, 0);
        assert_eq!(layer.absorb(&active), vec![1]);
        assert!(layer.is_empty());
    }

    #[test]
    fn guess_deltas_raise_attempts_and_clamp() {
        let mut layer = OptimisticLayer::new();
        layer.push(op(1, PendingKind::Guess { attempt: 3 }));
        layer.push(op(2, PendingKind::Guess { attempt: 9 }));

        let active = snapshot(PlayerStatus::Active, 2, 0);
        assert_eq!(layer.merge(&active).attempts, GameConfig::MAX_ATTEMPTS);

        let caught_up = snapshot(PlayerStatus::Active, 3, 0);
        assert_eq!(layer.absorb(&caught_up), vec![1]);
        assert_eq!(layer.len(), 1);

        let finished = snapshot(PlayerStatus::Completed, 3, 0);
        assert_eq!(layer.absorb(&finished), vec![2]);
    }

    #[test]
    fn removing_a_guess_renumbers_later_ones() {
        let mut layer = OptimisticLayer::new();
        layer.push(op(1, PendingKind::Guess { attempt: 1 }));
        layer.push(op(2, PendingKind::Guess { attempt: 2 }));
        layer.push(op(3, PendingKind::Guess { attempt: 3 }));

        layer.remove(2);
        let left: Vec<_> = layer.iter().map(|op| (op.ticket, op.kind)).collect();
        assert_eq!(
            left,
            vec![
                (1, PendingKind::Guess { attempt: 1 }),
                (3, PendingKind::Guess { attempt: 2 }),
            ]
        );
        assert!(layer.remove(2).is_none());
    }

    #[test]
    fn claim_zeroes_winnings_and_snapshot_wins_otherwise() {
        let mut layer = OptimisticLayer::new();
        let tx = TxHash::from_bytes(vec![7]);
        layer.push(PendingOp {
            ticket: 7,
            tx: tx.clone(),
            kind: PendingKind::Claim,
        });

        let finalized = snapshot(PlayerStatus::Completed, 4, 5_000_000);
        let merged = layer.merge(&finalized);
        assert_eq!(merged.winnings, TokenAmount::ZERO);
        assert_eq!(merged.status, PlayerStatus::Completed);
        assert_eq!(merged.attempts, 4);
        assert_eq!(layer.iter().find(|op| op.tx == tx).map(|op| op.ticket), Some(7));

        layer.clear();
        assert_eq!(layer.merge(&finalized).winnings, TokenAmount(5_000_000));
    }
}

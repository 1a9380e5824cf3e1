//! Common types for contract interactions.

use std::fmt;
use std::str::FromStr;

use game_core::{PlayerStatus, ProfileId, TokenAmount};

/// Round identifier (`currentGameId` on the contract).
pub type RoundId = u64;

// ============================================================================
// Identifiers
// ============================================================================

/// 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s)?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| format!("address must be 20 bytes, got {}", bytes.len()))?;
        Ok(Self(array))
    }
}

/// Transaction hash (or wallet call-bundle identifier for batched calls).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TxHash(pub Vec<u8>);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl FromStr for TxHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex(s).map(Self)
    }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for TxHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| format!("invalid hex {:?}: {}", s, e))
}

// ============================================================================
// Transactions
// ============================================================================

/// Transaction status on the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Submitted, not yet included
    Pending,

    /// Included and successful
    Confirmed { block: u64 },

    /// Included and reverted, or dropped by the wallet
    Failed { reason: String },
}

impl TransactionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pending)
    }
}

/// A contract call: target plus ABI-encoded calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Vec<u8>,
}

impl CallRequest {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self { to, data }
    }
}

/// Log query over an inclusive block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub from_block: u64,
    pub to_block: u64,
}

/// Raw event log as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
    pub block_number: u64,
}

// ============================================================================
// Contract state
// ============================================================================

/// Per-(round, player) record as stored by the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Raw status code (see [`PlayerStatus::from_code`])
    pub status_code: u8,

    /// Hash of the profile assigned as this player's target (zero before start)
    pub assigned_target: ProfileId,

    pub deposit_amount: TokenAmount,
    pub start_time: u64,
    pub end_time: u64,
    pub attempts: u64,
    pub final_score: u64,
}

impl PlayerRecord {
    pub fn status(&self) -> PlayerStatus {
        PlayerStatus::from_code(self.status_code)
    }

    /// Assigned target, `None` while the slot is still zero.
    pub fn assigned_target(&self) -> Option<ProfileId> {
        (!self.assigned_target.is_zero()).then_some(self.assigned_target)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Contract events consumed by the session runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractEvent {
    GameStarted {
        round: RoundId,
        player: Address,
        assigned_target: ProfileId,
    },
    GuessSubmitted {
        round: RoundId,
        player: Address,
        attempts: u64,
    },
    /// Round-level; carries no player.
    GameFinalized {
        round: RoundId,
        prize_pool: TokenAmount,
        finalizer: Address,
    },
    RewardClaimed {
        round: RoundId,
        player: Address,
        amount: TokenAmount,
    },
}

impl ContractEvent {
    pub fn round(&self) -> RoundId {
        match self {
            ContractEvent::GameStarted { round, .. }
            | ContractEvent::GuessSubmitted { round, .. }
            | ContractEvent::GameFinalized { round, .. }
            | ContractEvent::RewardClaimed { round, .. } => *round,
        }
    }

    /// Player the event refers to; `None` for round-level events.
    pub fn player(&self) -> Option<Address> {
        match self {
            ContractEvent::GameStarted { player, .. }
            | ContractEvent::GuessSubmitted { player, .. }
            | ContractEvent::RewardClaimed { player, .. } => Some(*player),
            ContractEvent::GameFinalized { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::GameStarted { .. } => "GameStarted",
            ContractEvent::GuessSubmitted { .. } => "GuessSubmitted",
            ContractEvent::GameFinalized { .. } => "GameFinalized",
            ContractEvent::RewardClaimed { .. } => "RewardClaimed",
        }
    }
}

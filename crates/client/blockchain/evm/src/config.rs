//! EVM chain configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use client_blockchain_core::Address;

/// How `approve` + `startGame` are submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Try an atomic wallet bundle, fall back to two transactions
    #[default]
    Auto,
    /// Require an atomic bundle
    Atomic,
    /// Always submit two transactions
    Sequential,
}

impl FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BatchMode::Auto),
            "atomic" => Ok(BatchMode::Atomic),
            "sequential" => Ok(BatchMode::Sequential),
            other => Err(format!(
                "Invalid batch mode: {}. Must be auto, atomic, or sequential",
                other
            )),
        }
    }
}

/// EVM-specific configuration.
#[derive(Debug, Clone)]
pub struct EvmConfig {
    /// JSON-RPC endpoint (node or wallet bridge)
    pub rpc_url: String,

    /// Chain the contract is deployed on
    pub chain_id: u64,

    /// Round contract
    pub contract_address: Address,

    /// Stake token (USDC)
    pub token_address: Address,

    pub batch_mode: BatchMode,

    /// Interval between event log polls
    pub poll_interval: Duration,

    /// Interval between receipt polls while waiting for confirmation
    pub receipt_poll_interval: Duration,

    /// Longest wait for the `approve` receipt when the start is split into
    /// two transactions
    pub approval_timeout: Duration,
}

impl EvmConfig {
    pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84_532;
    pub const BASE_SEPOLIA_RPC_URL: &'static str = "https://sepolia.base.org";
    pub const DEFAULT_CONTRACT: Address = Address([
        0x4a, 0xf1, 0x12, 0xf3, 0x26, 0x63, 0x8f, 0xf9, 0xf0, 0xa5, 0x56, 0x44, 0x43, 0xb6, 0x45,
        0xf0, 0x8c, 0x4e, 0xc1, 0x63,
    ]);
    /// USDC on Base Sepolia.
    pub const DEFAULT_TOKEN: Address = Address([
        0x03, 0x6c, 0xbd, 0x53, 0x84, 0x2c, 0x54, 0x26, 0x63, 0x4e, 0x79, 0x29, 0x54, 0x1e, 0xc2,
        0x31, 0x8f, 0x3d, 0xcf, 0x7e,
    ]);

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CYPHER_RPC_URL` - JSON-RPC endpoint (default: Base Sepolia public RPC)
    /// - `CYPHER_CHAIN_ID` - Expected chain id (default: 84532)
    /// - `CYPHER_CONTRACT_ADDRESS` - Round contract address
    /// - `CYPHER_TOKEN_ADDRESS` - Stake token address
    /// - `CYPHER_BATCH_MODE` - auto, atomic, or sequential (default: auto)
    /// - `CYPHER_POLL_INTERVAL_MS` - Event poll interval (default: 4000)
    /// - `CYPHER_RECEIPT_POLL_MS` - Receipt poll interval (default: 1500)
    /// - `CYPHER_APPROVAL_TIMEOUT_MS` - Approval receipt wait (default: 60000)
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(url) = env::var("CYPHER_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(chain_id) = read_env::<u64>("CYPHER_CHAIN_ID")? {
            config.chain_id = chain_id;
        }
        if let Some(address) = read_env::<Address>("CYPHER_CONTRACT_ADDRESS")? {
            config.contract_address = address;
        }
        if let Some(address) = read_env::<Address>("CYPHER_TOKEN_ADDRESS")? {
            config.token_address = address;
        }
        if let Some(mode) = read_env::<BatchMode>("CYPHER_BATCH_MODE")? {
            config.batch_mode = mode;
        }
        if let Some(ms) = read_env::<u64>("CYPHER_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("CYPHER_RECEIPT_POLL_MS")? {
            config.receipt_poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("CYPHER_APPROVAL_TIMEOUT_MS")? {
            config.approval_timeout = Duration::from_millis(ms.max(1));
        }

        Ok(config)
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    pub fn with_contract_address(mut self, address: Address) -> Self {
        self.contract_address = address;
        self
    }

    pub fn with_token_address(mut self, address: Address) -> Self {
        self.token_address = address;
        self
    }

    pub fn with_batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    pub fn network_name(&self) -> &str {
        match self.chain_id {
            Self::BASE_SEPOLIA_CHAIN_ID => "base-sepolia",
            8453 => "base",
            31337 => "local",
            _ => "custom",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(format!("Invalid RPC URL format: {}", self.rpc_url));
        }
        if self.chain_id == 0 {
            return Err("Chain id must be greater than 0".to_string());
        }
        if self.contract_address.is_zero() {
            return Err("Contract address cannot be zero".to_string());
        }
        if self.token_address.is_zero() {
            return Err("Token address cannot be zero".to_string());
        }
        Ok(())
    }
}

impl Default for EvmConfig {
    fn default() -> Self {
        Self {
            rpc_url: Self::BASE_SEPOLIA_RPC_URL.to_string(),
            chain_id: Self::BASE_SEPOLIA_CHAIN_ID,
            contract_address: Self::DEFAULT_CONTRACT,
            token_address: Self::DEFAULT_TOKEN,
            batch_mode: BatchMode::Auto,
            poll_interval: Duration::from_millis(4000),
            receipt_poll_interval: Duration::from_millis(1500),
            approval_timeout: Duration::from_secs(60),
        }
    }
}

/// Unset variables yield `None`; malformed ones are an error.
fn read_env<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("Invalid {}: {}", key, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_base_sepolia() {
        let config = EvmConfig::default();
        assert_eq!(config.chain_id, 84_532);
        assert_eq!(config.network_name(), "base-sepolia");
        assert_eq!(
            config.contract_address.to_string(),
            "0x4af112f326638ff9f0a5564443b645f08c4ec163"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(EvmConfig::default().with_rpc_url("ws://x").validate().is_err());
        assert!(
            EvmConfig::default()
                .with_contract_address(Address::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn batch_mode_parses_case_insensitively() {
        assert_eq!("Atomic".parse::<BatchMode>().unwrap(), BatchMode::Atomic);
        assert_eq!("sequential".parse::<BatchMode>().unwrap(), BatchMode::Sequential);
        assert!("both".parse::<BatchMode>().is_err());
    }
}

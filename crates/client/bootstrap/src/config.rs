//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use client_blockchain_core::Address;
use client_blockchain_evm::EvmConfig;
use runtime::RuntimeConfig;

/// Configuration required to bootstrap a session and its front-end.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub runtime: RuntimeConfig,
    pub evm: EvmConfig,

    /// Wallet account to connect at startup
    pub account: Option<Address>,

    /// JSON or TOML catalog replacing the embedded one
    pub catalog_path: Option<PathBuf>,

    /// Names the log directory of this run
    pub session_id: Option<String>,
}

impl ClientConfig {
    pub fn new(runtime: RuntimeConfig, evm: EvmConfig) -> Self {
        Self {
            runtime,
            evm,
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Besides the variables read by [`RuntimeConfig::from_env`] and
    /// [`EvmConfig::from_env`]:
    /// - `CYPHER_ACCOUNT` - Connected wallet address (default: disconnected)
    /// - `CYPHER_CATALOG_PATH` - Catalog file (default: embedded catalog)
    /// - `CYPHER_SESSION_ID` - Log session name (default: timestamp)
    pub fn from_env() -> Result<Self> {
        let evm = EvmConfig::from_env().map_err(|e| anyhow!("Invalid EVM configuration: {e}"))?;
        let mut config = Self::new(RuntimeConfig::from_env(), evm);

        if let Some(account) = non_empty("CYPHER_ACCOUNT") {
            let account = account
                .parse::<Address>()
                .map_err(|e| anyhow!(e))
                .context("CYPHER_ACCOUNT is not a valid address")?;
            config.account = Some(account);
        }

        config.catalog_path = non_empty("CYPHER_CATALOG_PATH").map(PathBuf::from);
        config.session_id = non_empty("CYPHER_SESSION_ID");

        Ok(config)
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Chain the session expects the wallet to be on.
    pub fn expected_chain_id(&self) -> u64 {
        self.evm.chain_id
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

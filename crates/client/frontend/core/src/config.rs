//! Frontend configuration structures and loaders.
//!
//! This module contains UI-specific configuration that is shared across
//! different frontend implementations.

use std::env;

/// Frontend-specific configuration.
#[derive(Clone, Debug, Default)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
    pub share: ShareConfig,
}

impl FrontendConfig {
    pub const fn new(messages: MessageConfig, share: ShareConfig) -> Self {
        Self { messages, share }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CYPHER_MESSAGE_CAPACITY` - Message log capacity (default: 64)
    /// - `CYPHER_SHOW_PROGRESS` - Show progress notices (default: true)
    /// - `CYPHER_SHOW_TX_EVENTS` - Show transaction lifecycle lines (default: false)
    /// - `CYPHER_SHARE_URL` - Link appended to share posts (default: https://cypher.game)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("CYPHER_MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }
        if let Some(show) = read_env_bool("CYPHER_SHOW_PROGRESS") {
            config.messages.show_progress = show;
        }
        if let Some(show) = read_env_bool("CYPHER_SHOW_TX_EVENTS") {
            config.messages.show_transactions = show;
        }
        if let Ok(url) = env::var("CYPHER_SHARE_URL")
            && !url.trim().is_empty()
        {
            config.share.play_url = url.trim().to_string();
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    pub show_progress: bool,
    pub show_transactions: bool,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            show_progress: true,
            show_transactions: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShareConfig {
    pub play_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            play_url: "https://cypher.game".to_string(),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

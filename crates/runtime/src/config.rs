//! Session runtime configuration.

use std::env;
use std::time::Duration;

use game_core::GameConfig;

/// Runtime configuration for the session controller.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,

    /// Upper bound on every confirmation wait
    pub confirmation_timeout: Duration,

    /// Buffered notices per topic before slow subscribers lag
    pub notice_capacity: usize,

    /// Buffered contract events between the chain source and the listener
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            confirmation_timeout: Duration::from_secs(120),
            notice_capacity: 64,
            event_buffer_size: 128,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CYPHER_CONFIRMATION_TIMEOUT_SECS` - Confirmation wait bound (default: 120)
    /// - `CYPHER_NOTICE_CAPACITY` - Notice buffer per topic (default: 64)
    /// - `CYPHER_EVENT_BUFFER` - Contract event buffer (default: 128)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_env::<u64>("CYPHER_CONFIRMATION_TIMEOUT_SECS") {
            config.confirmation_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(capacity) = read_env::<usize>("CYPHER_NOTICE_CAPACITY") {
            config.notice_capacity = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("CYPHER_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

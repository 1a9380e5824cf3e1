/// Game rules constants shared by the hint engine, the session runtime and
/// the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Decimal exponent of the settlement token (USDC uses 6).
    pub token_decimals: u8,
}

impl GameConfig {
    // ===== contract-mirrored constants =====
    /// Guesses a player may submit per round before the contract fails them.
    pub const MAX_ATTEMPTS: u32 = 8;

    // ===== hint thresholds =====
    /// A follower count within this percentage of the target is "close".
    pub const FOLLOWERS_CLOSE_PERCENT: u64 = 10;
    /// An age within this many years of the target is "close".
    pub const AGE_CLOSE_YEARS: u32 = 5;

    // ===== settlement token =====
    pub const TOKEN_DECIMALS: u8 = 6;
    pub const TOKEN_SYMBOL: &'static str = "USDC";

    /// Length of one daily round in milliseconds.
    pub const ROUND_LENGTH_MS: u64 = 86_400_000;

    pub fn new() -> Self {
        Self {
            token_decimals: Self::TOKEN_DECIMALS,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

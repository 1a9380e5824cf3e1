//! Settlement token amounts.
//!
//! Amounts are carried as integers in the token's smallest unit. Conversion
//! from and to human decimal text is done on digit strings, never through
//! floating point.

use std::fmt;

use thiserror::Error;

use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must be a decimal number, got {0:?}")]
    NotNumeric(String),

    #[error("amount must be positive")]
    NotPositive,

    #[error("amount is too large")]
    Overflow,
}

/// Amount in the token's smallest unit (10^-decimals).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TokenAmount(pub u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    pub const fn units(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse human decimal text (`"10"`, `"0.5"`, `".25"`).
    ///
    /// Fractional digits beyond `decimals` are truncated (floor). Negative,
    /// non-numeric and exponent forms are rejected.
    pub fn parse_decimal(text: &str, decimals: u8) -> Result<Self, AmountError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        if text.starts_with('-') {
            return Err(AmountError::NotPositive);
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(AmountError::NotNumeric(text.to_string()));
        }

        let scale = 10u128
            .checked_pow(u32::from(decimals))
            .ok_or(AmountError::Overflow)?;

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| AmountError::Overflow)?
        };

        let kept: String = fraction.chars().take(usize::from(decimals)).collect();
        let fraction_units = if kept.is_empty() {
            0
        } else {
            let padding = usize::from(decimals) - kept.len();
            let value = kept.parse::<u128>().map_err(|_| AmountError::Overflow)?;
            value * 10u128.pow(padding as u32)
        };

        whole_units
            .checked_mul(scale)
            .and_then(|units| units.checked_add(fraction_units))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Parse a stake: like [`Self::parse_decimal`] but zero is rejected.
    pub fn parse_stake(text: &str, decimals: u8) -> Result<Self, AmountError> {
        let amount = Self::parse_decimal(text, decimals)?;
        if amount.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }

    /// Render as decimal text with trailing fractional zeros trimmed.
    pub fn format_units(self, decimals: u8) -> String {
        let Some(scale) = 10u128.checked_pow(u32::from(decimals)) else {
            return self.0.to_string();
        };
        let whole = self.0 / scale;
        let fraction = self.0 % scale;
        if fraction == 0 {
            return whole.to_string();
        }

        let digits = format!("{:0width$}", fraction, width = usize::from(decimals));
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_units(GameConfig::TOKEN_DECIMALS))
    }
}

impl From<u128> for TokenAmount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: u8 = GameConfig::TOKEN_DECIMALS;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(TokenAmount::parse_decimal("10", D).unwrap().units(), 10_000_000);
        assert_eq!(TokenAmount::parse_decimal("0.5", D).unwrap().units(), 500_000);
        assert_eq!(TokenAmount::parse_decimal(".25", D).unwrap().units(), 250_000);
        assert_eq!(TokenAmount::parse_decimal("3.", D).unwrap().units(), 3_000_000);
        assert_eq!(TokenAmount::parse_decimal(" 1.000001 ", D).unwrap().units(), 1_000_001);
    }

    #[test]
    fn truncates_excess_precision() {
        assert_eq!(TokenAmount::parse_decimal("1.2345678", D).unwrap().units(), 1_234_567);
        assert_eq!(TokenAmount::parse_decimal("0.0000009", D).unwrap().units(), 0);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(TokenAmount::parse_decimal("", D), Err(AmountError::Empty));
        assert_eq!(TokenAmount::parse_decimal("-5", D), Err(AmountError::NotPositive));
        assert!(matches!(
            TokenAmount::parse_decimal("abc", D),
            Err(AmountError::NotNumeric(_))
        ));
        assert!(matches!(
            TokenAmount::parse_decimal("1e3", D),
            Err(AmountError::NotNumeric(_))
        ));
        assert!(matches!(
            TokenAmount::parse_decimal(".", D),
            Err(AmountError::NotNumeric(_))
        ));
        assert!(matches!(
            TokenAmount::parse_decimal("1.2.3", D),
            Err(AmountError::NotNumeric(_))
        ));
        assert_eq!(
            TokenAmount::parse_decimal("999999999999999999999999999999999999999", D),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn stake_must_be_positive() {
        assert_eq!(TokenAmount::parse_stake("0", D), Err(AmountError::NotPositive));
        assert_eq!(TokenAmount::parse_stake("0.0000001", D), Err(AmountError::NotPositive));
        assert_eq!(TokenAmount::parse_stake("10", D).unwrap().units(), 10_000_000);
    }

    #[test]
    fn formats_with_trimmed_fraction() {
        assert_eq!(TokenAmount(10_000_000).format_units(D), "10");
        assert_eq!(TokenAmount(1_500_000).format_units(D), "1.5");
        assert_eq!(TokenAmount(1).format_units(D), "0.000001");
        assert_eq!(TokenAmount(0).to_string(), "0");
        assert_eq!(TokenAmount(123).format_units(0), "123");
    }
}

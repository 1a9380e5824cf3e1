//! Text formatting helpers shared by every frontend.

use client_blockchain_core::Address;
use game_core::{AttributeKind, Direction, GameConfig, Hint, HintKind, Profile, TokenAmount};

/// `0x1234...abcd`
pub fn format_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Token amount with the currency suffix, e.g. `12.5 USDC`.
pub fn format_amount(amount: TokenAmount, decimals: u8) -> String {
    format!("{} {}", amount.format_units(decimals), GameConfig::TOKEN_SYMBOL)
}

/// Digit grouping with commas: `1200000` → `1,200,000`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Compact symbol for one hint: ✓, ~ or ✗, with an arrow for directions.
pub fn hint_symbol(hint: &Hint) -> String {
    let mark = match hint.kind {
        HintKind::Correct => '✓',
        HintKind::Close => '~',
        HintKind::Wrong => '✗',
    };
    match hint.direction {
        Some(Direction::Higher) => format!("{mark}↑"),
        Some(Direction::Lower) => format!("{mark}↓"),
        None => mark.to_string(),
    }
}

/// Colored square used in share grids.
pub fn hint_square(kind: HintKind) -> char {
    match kind {
        HintKind::Correct => '🟩',
        HintKind::Close => '🟨',
        HintKind::Wrong => '⬛',
    }
}

pub fn attribute_label(attribute: AttributeKind) -> &'static str {
    match attribute {
        AttributeKind::Association => "Association",
        AttributeKind::Ecosystem => "Ecosystem",
        AttributeKind::PfpTheme => "PFP",
        AttributeKind::Followers => "Followers",
        AttributeKind::Age => "Age",
    }
}

/// The guessed profile's value for `attribute`.
pub fn attribute_value(profile: &Profile, attribute: AttributeKind) -> String {
    let attributes = &profile.attributes;
    match attribute {
        AttributeKind::Association => attributes.association.to_string(),
        AttributeKind::Ecosystem => attributes.ecosystem.to_string(),
        AttributeKind::PfpTheme => attributes.pfp_theme.to_string(),
        AttributeKind::Followers => format_count(attributes.followers),
        AttributeKind::Age => attributes.age.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_shortened() {
        let address: Address = "0x4AF112f326638ff9f0A5564443b645F08c4eC163".parse().unwrap();
        assert_eq!(format_address(&address), "0x4af1...c163");
    }

    #[test]
    fn amounts_and_counts() {
        assert_eq!(format_amount(TokenAmount(12_500_000), 6), "12.5 USDC");
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(250_000), "250,000");
        assert_eq!(format_count(1_200_000), "1,200,000");
    }

    #[test]
    fn hint_symbols_carry_direction() {
        let hint = Hint {
            attribute: AttributeKind::Age,
            kind: HintKind::Close,
            direction: Some(Direction::Lower),
        };
        assert_eq!(hint_symbol(&hint), "~↓");
        assert_eq!(hint_square(HintKind::Wrong), '⬛');
    }
}

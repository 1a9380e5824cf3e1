//! Hint engine.
//!
//! Compares a guessed profile against the round's target and produces one
//! feedback signal per attribute, in a fixed order. Directions are relative
//! to the guess: `Higher` means the target's value is above the guessed one.

use strum::Display;

use crate::config::GameConfig;
use crate::profile::Profile;

/// Attribute a hint refers to, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum AttributeKind {
    Association,
    Ecosystem,
    PfpTheme,
    Followers,
    Age,
}

impl AttributeKind {
    /// Hint order used everywhere (display, share grid).
    pub const ORDER: [AttributeKind; 5] = [
        AttributeKind::Association,
        AttributeKind::Ecosystem,
        AttributeKind::PfpTheme,
        AttributeKind::Followers,
        AttributeKind::Age,
    ];

    /// Position of the attribute in [`Self::ORDER`].
    pub const fn index(self) -> usize {
        match self {
            AttributeKind::Association => 0,
            AttributeKind::Ecosystem => 1,
            AttributeKind::PfpTheme => 2,
            AttributeKind::Followers => 3,
            AttributeKind::Age => 4,
        }
    }

    /// Ordered numeric attributes carry a direction when not exact.
    pub const fn is_numeric(self) -> bool {
        matches!(self, AttributeKind::Followers | AttributeKind::Age)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum HintKind {
    Correct,
    Close,
    Wrong,
}

/// Which way the player has to move their next guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Higher,
    Lower,
}

/// Feedback for one attribute of one guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hint {
    pub attribute: AttributeKind,
    pub kind: HintKind,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub direction: Option<Direction>,
}

impl Hint {
    const fn categorical(attribute: AttributeKind, matches: bool) -> Self {
        Self {
            attribute,
            kind: if matches { HintKind::Correct } else { HintKind::Wrong },
            direction: None,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.kind == HintKind::Correct
    }
}

/// The five hints of one guess, in [`AttributeKind::ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Hints([Hint; 5]);

impl Hints {
    pub fn iter(&self) -> impl Iterator<Item = &Hint> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Hint] {
        &self.0
    }

    pub fn get(&self, attribute: AttributeKind) -> &Hint {
        &self.0[attribute.index()]
    }

    /// Every attribute matched exactly.
    pub fn is_solved(&self) -> bool {
        self.0.iter().all(Hint::is_correct)
    }
}

impl<'a> IntoIterator for &'a Hints {
    type Item = &'a Hint;
    type IntoIter = std::slice::Iter<'a, Hint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Generate the ordered hints for `guess` against `target`.
pub fn generate_hints(guess: &Profile, target: &Profile) -> Hints {
    let g = &guess.attributes;
    let t = &target.attributes;

    Hints([
        Hint::categorical(AttributeKind::Association, g.association == t.association),
        Hint::categorical(AttributeKind::Ecosystem, g.ecosystem == t.ecosystem),
        Hint::categorical(AttributeKind::PfpTheme, g.pfp_theme == t.pfp_theme),
        numeric_hint(
            AttributeKind::Followers,
            u128::from(g.followers),
            u128::from(t.followers),
            // diff <= target * 10%  <=>  diff * 100 <= target * 10
            |diff, target| diff * 100 <= target * u128::from(GameConfig::FOLLOWERS_CLOSE_PERCENT),
        ),
        numeric_hint(
            AttributeKind::Age,
            u128::from(g.age),
            u128::from(t.age),
            |diff, _| diff <= u128::from(GameConfig::AGE_CLOSE_YEARS),
        ),
    ])
}

fn numeric_hint(
    attribute: AttributeKind,
    guess: u128,
    target: u128,
    is_close: impl Fn(u128, u128) -> bool,
) -> Hint {
    if guess == target {
        return Hint {
            attribute,
            kind: HintKind::Correct,
            direction: None,
        };
    }

    let diff = guess.abs_diff(target);
    let kind = if is_close(diff, target) {
        HintKind::Close
    } else {
        HintKind::Wrong
    };
    let direction = if guess < target {
        Direction::Higher
    } else {
        Direction::Lower
    };

    Hint {
        attribute,
        kind,
        direction: Some(direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Association, Attributes, Ecosystem, PfpTheme};

    fn profile(followers: u64, age: u32) -> Profile {
        Profile::new(
            "Target",
            "@target",
            Attributes {
                association: Association::Base,
                ecosystem: Ecosystem::Base,
                pfp_theme: PfpTheme::Human,
                followers,
                age,
            },
        )
    }

    fn hint(hints: &Hints, attribute: AttributeKind) -> (HintKind, Option<Direction>) {
        let h = hints.get(attribute);
        (h.kind, h.direction)
    }

    #[test]
    fn hints_follow_fixed_attribute_order() {
        let hints = generate_hints(&profile(1, 1), &profile(2, 60));
        let order: Vec<_> = hints.iter().map(|h| h.attribute).collect();
        assert_eq!(order, AttributeKind::ORDER.to_vec());
    }

    #[test]
    fn identical_profiles_are_all_correct_without_direction() {
        let target = profile(1_000_000, 40);
        let hints = generate_hints(&target, &target);
        assert!(hints.is_solved());
        assert!(hints.iter().all(|h| h.direction.is_none()));
    }

    #[test]
    fn categorical_mismatch_is_wrong_without_direction() {
        let target = profile(10, 10);
        let mut guess = target.clone();
        guess.attributes.association = Association::Coinbase;
        guess.attributes.ecosystem = Ecosystem::Solana;
        guess.attributes.pfp_theme = PfpTheme::PixelArt;

        let hints = generate_hints(&guess, &target);
        for attribute in [
            AttributeKind::Association,
            AttributeKind::Ecosystem,
            AttributeKind::PfpTheme,
        ] {
            assert_eq!(hint(&hints, attribute), (HintKind::Wrong, None));
        }
        assert!(!hints.is_solved());
    }

    #[test]
    fn followers_within_ten_percent_are_close() {
        let target = profile(1_000_000, 40);
        let hints = generate_hints(&profile(950_000, 40), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Followers),
            (HintKind::Close, Some(Direction::Higher))
        );

        // Exactly on the threshold still counts as close
        let hints = generate_hints(&profile(1_100_000, 40), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Followers),
            (HintKind::Close, Some(Direction::Lower))
        );
    }

    #[test]
    fn followers_beyond_threshold_are_wrong_with_direction() {
        let target = profile(1_000_000, 40);
        let hints = generate_hints(&profile(800_000, 40), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Followers),
            (HintKind::Wrong, Some(Direction::Higher))
        );

        let hints = generate_hints(&profile(5_000_000, 40), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Followers),
            (HintKind::Wrong, Some(Direction::Lower))
        );
    }

    #[test]
    fn zero_follower_target_only_matches_exactly() {
        let target = profile(0, 40);
        let hints = generate_hints(&profile(1, 40), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Followers),
            (HintKind::Wrong, Some(Direction::Lower))
        );

        let hints = generate_hints(&profile(0, 40), &target);
        assert_eq!(hint(&hints, AttributeKind::Followers), (HintKind::Correct, None));
    }

    #[test]
    fn age_uses_fixed_five_year_window() {
        let target = profile(100, 40);

        let hints = generate_hints(&profile(100, 36), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Age),
            (HintKind::Close, Some(Direction::Higher))
        );

        let hints = generate_hints(&profile(100, 30), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Age),
            (HintKind::Wrong, Some(Direction::Higher))
        );

        let hints = generate_hints(&profile(100, 45), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Age),
            (HintKind::Close, Some(Direction::Lower))
        );
    }

    #[test]
    fn numeric_extremes_do_not_overflow() {
        let target = profile(u64::MAX, u32::MAX);
        let hints = generate_hints(&profile(0, 0), &target);
        assert_eq!(
            hint(&hints, AttributeKind::Followers),
            (HintKind::Wrong, Some(Direction::Higher))
        );
        assert_eq!(
            hint(&hints, AttributeKind::Age),
            (HintKind::Wrong, Some(Direction::Higher))
        );
    }
}

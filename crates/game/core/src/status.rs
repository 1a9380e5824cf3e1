//! Player status within a round, as projected from the contract.

use strum::Display;

/// Per-(round, player) state machine.
///
/// `Empty → Active → {Completed, Failed}`. Completed and Failed are terminal
/// for the round; transitions are only ever taken from contract reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    #[default]
    Empty,
    Active,
    Completed,
    Failed,
}

impl PlayerStatus {
    /// Map the contract's wire code. Unknown codes map to `Empty`.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => PlayerStatus::Active,
            2 => PlayerStatus::Completed,
            3 => PlayerStatus::Failed,
            _ => PlayerStatus::Empty,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            PlayerStatus::Empty => 0,
            PlayerStatus::Active => 1,
            PlayerStatus::Completed => 2,
            PlayerStatus::Failed => 3,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, PlayerStatus::Completed | PlayerStatus::Failed)
    }

    pub const fn accepts_guesses(self) -> bool {
        matches!(self, PlayerStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_statuses() {
        assert_eq!(PlayerStatus::from_code(0), PlayerStatus::Empty);
        assert_eq!(PlayerStatus::from_code(1), PlayerStatus::Active);
        assert_eq!(PlayerStatus::from_code(2), PlayerStatus::Completed);
        assert_eq!(PlayerStatus::from_code(3), PlayerStatus::Failed);
    }

    #[test]
    fn mapping_is_total() {
        for code in 4..=u8::MAX {
            assert_eq!(PlayerStatus::from_code(code), PlayerStatus::Empty);
        }
        for status in [
            PlayerStatus::Empty,
            PlayerStatus::Active,
            PlayerStatus::Completed,
            PlayerStatus::Failed,
        ] {
            assert_eq!(PlayerStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn only_active_accepts_guesses() {
        assert!(PlayerStatus::Active.accepts_guesses());
        assert!(!PlayerStatus::Empty.accepts_guesses());
        assert!(PlayerStatus::Failed.is_terminal());
        assert!(!PlayerStatus::Active.is_terminal());
        assert_eq!(PlayerStatus::Completed.to_string(), "COMPLETED");
    }
}

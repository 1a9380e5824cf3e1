//! View-model snapshots derived from [`runtime::SessionView`].
use game_core::{AttributeKind, GameConfig, HintKind, TokenAmount};
use runtime::{BlockingCondition, GuessPhase, GuessRecord, SessionView};

use crate::format::{attribute_label, attribute_value, format_address, hint_symbol};
use crate::message::{MessageEntry, MessageLog};

/// Which screen the session is on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Blocked(BlockingCondition),
    /// Round id not read yet
    Loading,
    StartPrompt,
    Playing { attempts: u32, max: u32 },
    /// Round over for this player, results not final yet
    AwaitingResults,
    Won { winnings: TokenAmount },
    RoundOver,
}

impl Screen {
    pub fn from_view(view: &SessionView) -> Self {
        if let Some(condition) = view.blocking {
            return Screen::Blocked(condition);
        }
        if view.game_id.is_none() {
            return Screen::Loading;
        }
        if !view.is_terminal() {
            return if view.player_status.accepts_guesses() {
                Screen::Playing {
                    attempts: view.attempts,
                    max: GameConfig::MAX_ATTEMPTS,
                }
            } else {
                Screen::StartPrompt
            };
        }

        if !view.is_finalized {
            Screen::AwaitingResults
        } else if view.winnings.is_zero() {
            Screen::RoundOver
        } else {
            Screen::Won {
                winnings: view.winnings,
            }
        }
    }
}

/// High-level snapshot of the session used by presentation layers.
#[derive(Clone, Debug)]
pub struct SessionFrame {
    pub header: HeaderSnapshot,
    pub screen: Screen,
    pub guesses: Vec<GuessRow>,
    pub messages: Vec<MessageEntry>,
    pub error: Option<String>,
    pub stalled: usize,
    pub is_loading: bool,
}

impl SessionFrame {
    pub fn from_view(view: &SessionView, messages: &MessageLog, message_limit: usize) -> Self {
        Self {
            header: HeaderSnapshot::from_view(view),
            screen: Screen::from_view(view),
            guesses: view.guesses.iter().map(GuessRow::from_record).collect(),
            messages: collect_messages(messages, message_limit),
            error: view.error.clone(),
            stalled: view.stalled.len(),
            is_loading: view.is_loading,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderSnapshot {
    pub game_id: Option<u64>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub wallet: Option<String>,
}

impl HeaderSnapshot {
    fn from_view(view: &SessionView) -> Self {
        Self {
            game_id: view.game_id,
            attempts: view.attempts,
            max_attempts: GameConfig::MAX_ATTEMPTS,
            wallet: view.account.as_ref().map(format_address),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessRow {
    pub attempt: u32,
    pub name: String,
    pub handle: String,
    pub pending: bool,
    /// Empty while hints are unresolved
    pub cells: Vec<HintCell>,
}

impl GuessRow {
    fn from_record(record: &GuessRecord) -> Self {
        let cells = record
            .hints
            .as_ref()
            .map(|hints| {
                hints
                    .iter()
                    .map(|hint| HintCell {
                        attribute: hint.attribute,
                        label: attribute_label(hint.attribute),
                        value: attribute_value(&record.guess, hint.attribute),
                        kind: hint.kind,
                        symbol: hint_symbol(hint),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            attempt: record.attempt,
            name: record.guess.name.clone(),
            handle: record.guess.handle.clone(),
            pending: record.phase == GuessPhase::Pending,
            cells,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintCell {
    pub attribute: AttributeKind,
    pub label: &'static str,
    pub value: String,
    pub kind: HintKind,
    pub symbol: String,
}

fn collect_messages(log: &MessageLog, limit: usize) -> Vec<MessageEntry> {
    let mut messages: Vec<_> = log.recent(limit).cloned().collect();
    messages.reverse();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::Address;
    use game_core::PlayerStatus;

    fn view(status: PlayerStatus) -> SessionView {
        SessionView {
            account: Some(Address([1; 20])),
            game_id: Some(3),
            player_status: status,
            ..SessionView::default()
        }
    }

    #[test]
    fn screens_follow_status_and_finalization() {
        assert_eq!(Screen::from_view(&view(PlayerStatus::Empty)), Screen::StartPrompt);
        assert_eq!(
            Screen::from_view(&view(PlayerStatus::Active)),
            Screen::Playing {
                attempts: 0,
                max: GameConfig::MAX_ATTEMPTS
            }
        );

        let mut done = view(PlayerStatus::Completed);
        assert_eq!(Screen::from_view(&done), Screen::AwaitingResults);
        done.is_finalized = true;
        assert_eq!(Screen::from_view(&done), Screen::RoundOver);
        done.winnings = TokenAmount(3_000_000);
        assert_eq!(
            Screen::from_view(&done),
            Screen::Won {
                winnings: TokenAmount(3_000_000)
            }
        );
    }

    #[test]
    fn blocking_and_loading_take_precedence() {
        let mut blocked = view(PlayerStatus::Active);
        blocked.blocking = Some(BlockingCondition::WalletDisconnected);
        assert_eq!(
            Screen::from_view(&blocked),
            Screen::Blocked(BlockingCondition::WalletDisconnected)
        );

        let loading = SessionView::default();
        assert_eq!(Screen::from_view(&loading), Screen::Loading);
    }

    #[test]
    fn frame_keeps_message_order() {
        let mut log = MessageLog::new(8);
        log.push_text("first");
        log.push_text("second");
        log.push_text("third");

        let frame = SessionFrame::from_view(&view(PlayerStatus::Active), &log, 2);
        let texts: Vec<_> = frame.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "third"]);
        assert_eq!(frame.header.wallet.as_deref(), Some("0x0101...0101"));
    }
}

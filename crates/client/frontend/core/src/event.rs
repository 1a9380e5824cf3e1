//! Utilities for reacting to runtime events inside UI layers.
use runtime::{Event, NoticeKind, TxStage};

use crate::config::MessageConfig;
use crate::message::{MessageEntry, MessageLog};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventImpact {
    pub requires_redraw: bool,
}

impl EventImpact {
    pub const fn none() -> Self {
        Self {
            requires_redraw: false,
        }
    }

    pub const fn redraw() -> Self {
        Self {
            requires_redraw: true,
        }
    }

    pub fn combine(self, other: Self) -> Self {
        Self {
            requires_redraw: self.requires_redraw || other.requires_redraw,
        }
    }
}

pub trait EventConsumer {
    fn on_event(&mut self, event: &Event) -> EventImpact;
    fn message_log(&self) -> &MessageLog;
    fn message_log_mut(&mut self) -> &mut MessageLog;
    fn take_message_log(self) -> MessageLog
    where
        Self: Sized;
}

/// Default consumer: files runtime events into a [`MessageLog`].
#[derive(Clone, Debug)]
pub struct NoticeCollector {
    log: MessageLog,
    config: MessageConfig,
    clock: fn() -> Option<u64>,
}

impl NoticeCollector {
    pub fn new(config: MessageConfig) -> Self {
        Self {
            log: MessageLog::new(config.capacity),
            config,
            clock: || None,
        }
    }

    /// Stamp entries with `clock` (unix milliseconds).
    pub fn with_clock(mut self, clock: fn() -> Option<u64>) -> Self {
        self.clock = clock;
        self
    }
}

impl EventConsumer for NoticeCollector {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        let timestamp = (self.clock)();
        match event {
            Event::Notice(notice) => {
                if notice.kind == NoticeKind::Progress && !self.config.show_progress {
                    return EventImpact::none();
                }
                self.log.push_notice(notice, timestamp);
                EventImpact::redraw()
            }
            Event::Transaction(tx_event) => {
                if !self.config.show_transactions {
                    return EventImpact::none();
                }
                let stage = match &tx_event.stage {
                    TxStage::Submitted => "submitted".to_string(),
                    TxStage::Confirmed => "confirmed".to_string(),
                    TxStage::Failed { reason } => format!("failed ({reason})"),
                    TxStage::Stalled => "still pending".to_string(),
                };
                let text = format!("{} transaction {} {}", tx_event.action.label(), tx_event.tx, stage);
                self.log.push(MessageEntry::new(
                    text,
                    timestamp,
                    runtime::NoticeLevel::Info,
                ));
                EventImpact::redraw()
            }
        }
    }

    fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn message_log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    fn take_message_log(self) -> MessageLog {
        self.log
    }
}

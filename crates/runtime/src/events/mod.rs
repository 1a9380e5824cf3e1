//! Topic-based event bus for session events.
//!
//! Notices and transaction lifecycle events are published to separate topics;
//! consumers subscribe only to the ones they need. Session state itself is
//! published through a watch channel, not through the bus.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{Notice, NoticeKind, NoticeLevel, TransactionEvent, TxAction, TxStage};

//! Session state: authoritative snapshot, pending deltas, guess log and the
//! merged view published to observers.

mod guess_log;
mod optimistic;
mod snapshot;
mod view;

pub use guess_log::GuessLog;
pub use optimistic::{Merged, OptimisticLayer, PendingKind, PendingOp, Ticket};
pub use snapshot::Snapshot;
pub use view::{BlockingCondition, GuessPhase, GuessRecord, SessionView};

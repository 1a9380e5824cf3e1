//! Cross-frontend primitives for presenting the game.
//!
//! Houses message logging, event handling, share text and view-model types
//! that the CLI and future graphical clients can reuse.
pub mod config;
pub mod event;
pub mod format;
pub mod frontend;
pub mod message;
pub mod share;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig, ShareConfig};
pub use event::{EventConsumer, EventImpact, NoticeCollector};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLog};
pub use share::{share_intent_url, share_text};
pub use view_model::{GuessRow, HeaderSnapshot, HintCell, Screen, SessionFrame};

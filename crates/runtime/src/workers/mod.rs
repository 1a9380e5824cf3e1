//! Worker tasks that back the session controller.

mod listener;

pub use listener::EventListener;

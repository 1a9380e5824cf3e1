//! Contract event listener.
//!
//! Forwards contract events into [`SessionController::handle_event`]. A
//! lagged receiver has lost events, so the worker falls back to a full
//! reconcile; a closed stream ends the task.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use client_blockchain_core::ContractEvent;

use crate::controller::SessionController;

/// Background worker routing contract events into one session.
pub struct EventListener {
    controller: SessionController,
    events: broadcast::Receiver<ContractEvent>,
}

impl EventListener {
    pub fn new(controller: SessionController, events: broadcast::Receiver<ContractEvent>) -> Self {
        Self { controller, events }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!("contract event listener started");

        loop {
            match self.events.recv().await {
                Ok(event) => {
                    let route = self.controller.handle_event(&event).await;
                    debug!(event = event.name(), ?route, "contract event handled");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event listener lagged; reconciling");
                    if let Err(error) = self.controller.reconcile().await {
                        warn!(%error, "reconcile after lag failed");
                    }
                }
                Err(RecvError::Closed) => {
                    info!("contract event stream closed; listener stopping");
                    break;
                }
            }
        }
    }
}

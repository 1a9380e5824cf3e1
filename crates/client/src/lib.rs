//! Top-level client orchestrating the session and a frontend.
//!
//! # Architecture
//!
//! ```text
//! Client (composition root)
//!   ├─→ SessionSetup (catalog, contract client, controller, background tasks)
//!   └─→ Frontend (drives the controller until the user quits)
//! ```
//!
//! One-shot subcommands skip the frontend and call [`commands`] directly.

mod builder;
pub mod commands;
pub mod console;
pub mod logging;

pub use builder::ClientBuilder;
pub use console::ConsoleFrontend;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use anyhow::Result;
use client_bootstrap::SessionSetup;

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. `Client::builder()` receives an assembled session and a frontend
/// 2. `Client::run()` hands the controller to the frontend (blocking)
/// 3. On frontend exit, the event poller and listener are stopped
pub struct Client {
    setup: SessionSetup,
    frontend: Box<dyn Frontend>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn run(self) -> Result<()> {
        let controller = self.setup.controller.clone();

        let mut frontend = self.frontend;
        let frontend_result = frontend.run(controller).await;

        self.setup.shutdown().await;
        frontend_result
    }
}

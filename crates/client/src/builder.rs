//! Client builder with dependency injection pattern.

use anyhow::{Context, Result};
use client_bootstrap::SessionSetup;

use crate::{Client, Frontend};

/// Builder for constructing a [`Client`]. Both parts are required.
#[derive(Default)]
pub struct ClientBuilder {
    setup: Option<SessionSetup>,
    frontend: Option<Box<dyn Frontend>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assembled session, built by `client_bootstrap::SessionBuilder`.
    pub fn session(mut self, setup: SessionSetup) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    pub fn build(self) -> Result<Client> {
        let setup = self
            .setup
            .context("Session is required. Use .session() to set it.")?;

        let frontend = self
            .frontend
            .context("Frontend is required. Use .frontend() to set it.")?;

        Ok(Client { setup, frontend })
    }
}

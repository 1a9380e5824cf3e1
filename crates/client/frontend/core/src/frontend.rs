//! Trait describing a runnable client front-end.
use anyhow::Result;
use async_trait::async_trait;
use runtime::SessionController;

/// Frontend abstraction for UI layers.
///
/// Frontends communicate with the game via [`SessionController`]:
/// - Watch the merged session view
/// - Subscribe to notices
/// - Issue start / guess / claim commands
///
/// Frontends do NOT own the contract client; they receive a controller
/// handle for communication only.
#[async_trait]
pub trait Frontend: Send {
    /// Run the frontend event loop until the user quits.
    async fn run(&mut self, controller: SessionController) -> Result<()>;
}

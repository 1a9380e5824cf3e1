//! Builds the catalog, contract client and session controller used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::GameContract;
use client_blockchain_evm::EvmGameContract;
use game_content::{Catalog, CatalogLoader};
use runtime::SessionController;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;

/// Builder that assembles a ready-to-use session for clients.
pub struct SessionBuilder {
    config: ClientConfig,
    catalog: Option<Catalog>,
    contract: Option<Arc<dyn GameContract>>,
}

impl SessionBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            catalog: None,
            contract: None,
        }
    }

    /// Use an in-memory catalog instead of loading one.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide a custom contract client (e.g., an in-memory double).
    ///
    /// Without one, a JSON-RPC client is created from the EVM configuration
    /// and its log poller is started.
    pub fn contract(mut self, contract: Arc<dyn GameContract>) -> Self {
        self.contract = Some(contract);
        self
    }

    pub async fn build(self) -> Result<SessionSetup> {
        let catalog = match (self.catalog, &self.config.catalog_path) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => CatalogLoader::load(path)?,
            (None, None) => Catalog::embedded().context("Embedded catalog is invalid")?,
        };
        let catalog = Arc::new(catalog);
        tracing::info!("Catalog ready with {} profiles", catalog.len());

        let mut tasks = Vec::new();
        let contract = match self.contract {
            Some(contract) => contract,
            None => {
                let evm = EvmGameContract::new(
                    self.config.evm.clone(),
                    self.config.runtime.event_buffer_size,
                )
                .context("Failed to create contract client")?;
                tracing::info!(
                    "Contract client on {} ({}) at {}",
                    evm.config().network_name(),
                    evm.config().rpc_url,
                    evm.config().contract_address
                );
                tasks.push(evm.spawn_event_poller());
                Arc::new(evm) as Arc<dyn GameContract>
            }
        };

        let controller = SessionController::new(
            contract,
            Arc::clone(&catalog),
            self.config.runtime.clone(),
            self.config.expected_chain_id(),
        );
        tasks.push(controller.spawn_event_listener(controller.contract_events()));

        // Both failures are already reflected in the session view
        if let Err(e) = controller.check_network().await {
            tracing::warn!("Network check failed: {}", e);
        }
        if let Some(account) = self.config.account
            && let Err(e) = controller.set_account(Some(account)).await
        {
            tracing::warn!("Initial reconcile failed: {}", e);
        }

        Ok(SessionSetup {
            config: self.config,
            catalog,
            controller,
            tasks,
        })
    }
}

pub struct SessionSetup {
    pub config: ClientConfig,
    pub catalog: Arc<Catalog>,
    pub controller: SessionController,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionSetup {
    /// Stop the background poller and listener.
    pub async fn shutdown(self) {
        for task in self.tasks {
            task.abort();
            let _ = task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use client_blockchain_core::{Address, MockGameContract};
    use runtime::BlockingCondition;

    use super::*;

    const PLAYER: Address = Address([0xAB; 20]);

    #[tokio::test]
    async fn builds_connected_session_over_a_contract_double() {
        let mock = MockGameContract::new();
        mock.set_round(7);

        let setup = SessionBuilder::new(ClientConfig::default().with_account(PLAYER))
            .contract(Arc::new(mock.clone()))
            .build()
            .await
            .unwrap();

        let view = setup.controller.view();
        assert_eq!(view.account, Some(PLAYER));
        assert_eq!(view.game_id, Some(7));
        assert_eq!(view.blocking, None);
        assert_eq!(setup.catalog.len(), Catalog::embedded().unwrap().len());

        setup.shutdown().await;
    }

    #[tokio::test]
    async fn missing_account_leaves_wallet_disconnected() {
        let setup = SessionBuilder::new(ClientConfig::default())
            .contract(Arc::new(MockGameContract::new()))
            .build()
            .await
            .unwrap();

        assert_eq!(
            setup.controller.view().blocking,
            Some(BlockingCondition::WalletDisconnected)
        );
        setup.shutdown().await;
    }

    #[tokio::test]
    async fn wrong_chain_is_reported_not_fatal() {
        let mock = MockGameContract::new();
        mock.set_chain_id(1);

        let setup = SessionBuilder::new(ClientConfig::default().with_account(PLAYER))
            .contract(Arc::new(mock))
            .build()
            .await
            .unwrap();

        assert!(matches!(
            setup.controller.view().blocking,
            Some(BlockingCondition::WrongNetwork { actual: 1, .. })
        ));
        setup.shutdown().await;
    }

    #[tokio::test]
    async fn catalog_path_replaces_embedded_catalog() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(
            br#"[{"name": "Jesse Pollak", "handle": "@jessepollak", "attributes": {"association": "Base", "ecosystem": "Base", "pfpTheme": "Human", "followers": 250000, "age": 35}}]"#,
        )
        .unwrap();

        let setup = SessionBuilder::new(ClientConfig::default().with_catalog_path(file.path()))
            .contract(Arc::new(MockGameContract::new()))
            .build()
            .await
            .unwrap();

        assert_eq!(setup.catalog.len(), 1);
        assert!(setup.controller.catalog().find_by_name("jesse pollak").is_some());
        setup.shutdown().await;
    }
}

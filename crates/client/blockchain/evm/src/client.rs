//! EVM implementation of the round contract client.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use client_blockchain_core::{
    Address, BlockchainTransport, CallRequest, ConfirmationWatcher, ContractError, ContractEvent,
    EventSource, GameActions, GameContract, PlayerRecord, RoundId, RoundReader, TransactionStatus,
    TransportError, TxHash,
};
use game_core::TokenAmount;

use crate::abi::{self, AbiError};
use crate::config::{BatchMode, EvmConfig};
use crate::poller::EventPoller;
use crate::rpc::JsonRpcTransport;

/// JSON-RPC error code for `execution reverted` on most nodes.
const REVERT_CODE: i64 = 3;

impl From<AbiError> for ContractError {
    fn from(error: AbiError) -> Self {
        ContractError::Decode(error.to_string())
    }
}

fn contract_error(error: TransportError) -> ContractError {
    match error {
        TransportError::RpcError { code, message }
            if code == REVERT_CODE || message.contains("revert") =>
        {
            ContractError::Reverted(message)
        }
        TransportError::Rejected(message) => ContractError::Rejected(message),
        other => ContractError::Transport(other),
    }
}

/// Round contract client over any [`BlockchainTransport`].
pub struct EvmGameContract<T: BlockchainTransport = JsonRpcTransport> {
    transport: Arc<T>,
    config: EvmConfig,
    events: broadcast::Sender<ContractEvent>,
    /// Ids returned by `wallet_sendCalls`, tracked through `wallet_getCallsStatus`.
    bundles: Mutex<HashSet<TxHash>>,
    /// Cleared once the wallet reports bundles as unsupported.
    batching_available: AtomicBool,
}

impl EvmGameContract<JsonRpcTransport> {
    /// Create a client talking JSON-RPC to `config.rpc_url`.
    pub fn new(config: EvmConfig, event_capacity: usize) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::ConfigError)?;
        let transport = JsonRpcTransport::new(config.rpc_url.clone());
        Ok(Self::with_transport(config, Arc::new(transport), event_capacity))
    }
}

impl<T: BlockchainTransport + 'static> EvmGameContract<T> {
    pub fn with_transport(config: EvmConfig, transport: Arc<T>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            transport,
            config,
            events,
            bundles: Mutex::new(HashSet::new()),
            batching_available: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    /// Start polling contract logs into this client's event stream.
    pub fn spawn_event_poller(&self) -> JoinHandle<()> {
        EventPoller::new(
            Arc::clone(&self.transport),
            self.config.contract_address,
            self.config.poll_interval,
            self.events.clone(),
        )
        .spawn()
    }

    async fn read(&self, data: Vec<u8>) -> Result<Vec<u8>, ContractError> {
        let request = CallRequest::new(self.config.contract_address, data);
        self.transport.call(&request).await.map_err(contract_error)
    }

    async fn send(&self, player: Address, request: CallRequest) -> Result<TxHash, ContractError> {
        self.transport
            .send_transaction(player, &request)
            .await
            .map_err(contract_error)
    }

    async fn start_batched(
        &self,
        player: Address,
        calls: &[CallRequest],
    ) -> Result<TxHash, TransportError> {
        let bundle = self
            .transport
            .send_calls(player, self.config.chain_id, calls)
            .await?;
        if let Ok(mut bundles) = self.bundles.lock() {
            bundles.insert(bundle.clone());
        }
        Ok(bundle)
    }

    /// `approve`, wait for it to land, then `startGame`.
    async fn start_sequential(
        &self,
        player: Address,
        approve: CallRequest,
        start: CallRequest,
    ) -> Result<TxHash, ContractError> {
        let approve_tx = self.send(player, approve).await?;
        tracing::debug!(tx = %approve_tx, "Approval submitted");

        let waited = tokio::time::timeout(
            self.config.approval_timeout,
            self.wait_for_confirmation(&approve_tx),
        )
        .await
        .map_err(|_| ContractError::TimedOut(format!("approval {}", approve_tx)))?;

        match waited? {
            TransactionStatus::Failed { reason } => {
                return Err(ContractError::Reverted(format!("approve failed: {}", reason)));
            }
            TransactionStatus::Confirmed { .. } | TransactionStatus::Pending => {}
        }

        self.send(player, start).await
    }

    fn is_bundle(&self, tx: &TxHash) -> bool {
        self.bundles
            .lock()
            .map(|bundles| bundles.contains(tx))
            .unwrap_or(false)
    }
}

#[async_trait]
impl<T: BlockchainTransport + 'static> RoundReader for EvmGameContract<T> {
    async fn current_round(&self) -> Result<RoundId, ContractError> {
        let data = self.read(abi::current_game_id()).await?;
        let words = abi::words(&data, 1)?;
        Ok(abi::decode_u64(&words[0], "currentGameId")?)
    }

    async fn player_record(
        &self,
        round: RoundId,
        player: Address,
    ) -> Result<PlayerRecord, ContractError> {
        let data = self.read(abi::daily_player_data(round, player)).await?;
        Ok(abi::decode_player_record(&data)?)
    }

    async fn is_finalized(&self, round: RoundId) -> Result<bool, ContractError> {
        let data = self.read(abi::is_finalized(round)).await?;
        let words = abi::words(&data, 1)?;
        Ok(abi::decode_bool(&words[0])?)
    }

    async fn winnings(&self, round: RoundId, player: Address) -> Result<TokenAmount, ContractError> {
        let data = self.read(abi::daily_winnings(round, player)).await?;
        let words = abi::words(&data, 1)?;
        Ok(TokenAmount(abi::decode_u128(&words[0], "dailyWinnings")?))
    }

    async fn chain_id(&self) -> Result<u64, ContractError> {
        self.transport.chain_id().await.map_err(contract_error)
    }
}

#[async_trait]
impl<T: BlockchainTransport + 'static> GameActions for EvmGameContract<T> {
    async fn approve_and_start(
        &self,
        player: Address,
        amount: TokenAmount,
    ) -> Result<TxHash, ContractError> {
        let approve = CallRequest::new(
            self.config.token_address,
            abi::approve(self.config.contract_address, amount),
        );
        let start = CallRequest::new(self.config.contract_address, abi::start_game(amount));

        let try_batch = match self.config.batch_mode {
            BatchMode::Sequential => false,
            BatchMode::Atomic => true,
            BatchMode::Auto => self.batching_available.load(Ordering::Relaxed),
        };

        if try_batch {
            let calls = [approve.clone(), start.clone()];
            match self.start_batched(player, &calls).await {
                Ok(bundle) => {
                    tracing::info!(%bundle, amount = %amount, "Submitted approve + startGame bundle");
                    return Ok(bundle);
                }
                Err(TransportError::Unsupported(reason))
                    if self.config.batch_mode == BatchMode::Auto =>
                {
                    tracing::warn!(
                        %reason,
                        "Wallet does not support call bundles; falling back to two transactions"
                    );
                    self.batching_available.store(false, Ordering::Relaxed);
                }
                Err(e) => return Err(contract_error(e)),
            }
        }

        let tx = self.start_sequential(player, approve, start).await?;
        tracing::info!(%tx, amount = %amount, "Submitted startGame");
        Ok(tx)
    }

    async fn submit_guess(&self, player: Address, guess: &str) -> Result<TxHash, ContractError> {
        let request = CallRequest::new(self.config.contract_address, abi::submit_guess(guess));
        let tx = self.send(player, request).await?;
        tracing::info!(%tx, guess, "Submitted guess");
        Ok(tx)
    }

    async fn claim_reward(&self, player: Address, round: RoundId) -> Result<TxHash, ContractError> {
        let request = CallRequest::new(self.config.contract_address, abi::claim_reward(round));
        let tx = self.send(player, request).await?;
        tracing::info!(%tx, round, "Submitted reward claim");
        Ok(tx)
    }
}

#[async_trait]
impl<T: BlockchainTransport + 'static> ConfirmationWatcher for EvmGameContract<T> {
    async fn transaction_status(&self, tx: &TxHash) -> Result<TransactionStatus, ContractError> {
        let status = if self.is_bundle(tx) {
            self.transport.query_calls(tx).await
        } else {
            self.transport.query_transaction(tx).await
        };
        status.map_err(contract_error)
    }

    fn confirmation_poll_interval(&self) -> Duration {
        self.config.receipt_poll_interval
    }
}

impl<T: BlockchainTransport + 'static> EventSource for EvmGameContract<T> {
    fn subscribe_events(&self) -> broadcast::Receiver<ContractEvent> {
        self.events.subscribe()
    }
}

impl<T: BlockchainTransport + 'static> GameContract for EvmGameContract<T> {
    fn name(&self) -> &str {
        "EVM"
    }

    fn network(&self) -> &str {
        self.config.network_name()
    }
}

//! Log poller feeding the contract event stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use client_blockchain_core::{
    Address, BlockchainTransport, ContractEvent, LogFilter, TransportError,
};

use crate::abi;

/// Polls `eth_getLogs` for the round contract and republishes decoded events.
///
/// Starts at the head block observed on the first poll; history before the
/// client started is recovered by reconciliation, not replayed.
pub struct EventPoller<T: BlockchainTransport> {
    transport: Arc<T>,
    contract: Address,
    interval: Duration,
    sender: broadcast::Sender<ContractEvent>,
    next_block: Option<u64>,
}

impl<T: BlockchainTransport + 'static> EventPoller<T> {
    pub fn new(
        transport: Arc<T>,
        contract: Address,
        interval: Duration,
        sender: broadcast::Sender<ContractEvent>,
    ) -> Self {
        Self {
            transport,
            contract,
            interval,
            sender,
            next_block: None,
        }
    }

    /// Fetch logs up to the current head and return the decoded events.
    pub async fn poll_once(&mut self) -> Result<Vec<ContractEvent>, TransportError> {
        let head = self.transport.block_number().await?;
        let from_block = self.next_block.unwrap_or(head);
        if from_block > head {
            return Ok(Vec::new());
        }

        let filter = LogFilter {
            address: self.contract,
            from_block,
            to_block: head,
        };
        let logs = self.transport.get_logs(&filter).await?;
        self.next_block = Some(head + 1);

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match abi::decode_event(log) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(block = log.block_number, error = %e, "Skipping undecodable log")
                }
            }
        }
        Ok(events)
    }

    /// Run until the task is aborted or every receiver is gone.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.poll_once().await {
                    Ok(events) => {
                        for event in events {
                            tracing::debug!(event = event.name(), round = event.round(), "Contract event");
                            if self.sender.send(event).is_err() && self.sender.receiver_count() == 0 {
                                tracing::debug!("No event subscribers left; poller exiting");
                                return;
                            }
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Event poll failed"),
                }
            }
        })
    }
}

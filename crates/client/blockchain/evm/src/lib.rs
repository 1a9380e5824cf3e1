//! EVM backend for the round contract.
//!
//! Implements the `client-blockchain-core` traits over Ethereum JSON-RPC:
//! a hand-sized ABI codec, an HTTP transport, and a log poller that turns
//! contract logs into [`ContractEvent`](client_blockchain_core::ContractEvent)s.

pub mod abi;
pub mod client;
pub mod config;
pub mod conversion;
pub mod poller;
pub mod rpc;

pub use abi::AbiError;
pub use client::EvmGameContract;
pub use config::{BatchMode, EvmConfig};
pub use poller::EventPoller;
pub use rpc::JsonRpcTransport;

//! JSON-RPC transport over HTTP.
//!
//! Talks to a node or wallet bridge that holds the player's keys: writes go
//! through `eth_sendTransaction` / `wallet_sendCalls` and are signed on the
//! other side.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use client_blockchain_core::{
    Address, BlockchainTransport, CallRequest, LogEntry, LogFilter, TransactionStatus,
    TransportError, TxHash,
};

use crate::conversion::{
    parse_address, parse_data, parse_quantity, parse_tx_hash, parse_word, to_data, to_quantity,
};

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    status: Option<String>,
    block_number: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: String,
    topics: Vec<String>,
    data: String,
    block_number: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcCallsStatus {
    status: Value,
    #[serde(default)]
    receipts: Vec<RpcReceipt>,
}

/// HTTP JSON-RPC transport.
pub struct JsonRpcTransport {
    url: String,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one request and return its `result` (may be `null`).
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::trace!(method, id = request.id, "JSON-RPC request");

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::NetworkError(format!("{}: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::NetworkError(format!(
                "{} failed with status {}: {}",
                method, status, error_text
            )));
        }

        let body: RpcResponse = response.json().await.map_err(|e| {
            TransportError::SerializationError(format!("{} response: {}", method, e))
        })?;

        if let Some(error) = body.error {
            tracing::debug!(method, code = error.code, message = %error.message, "JSON-RPC error");
            return Err(TransportError::from_rpc(error.code, error.message));
        }

        Ok(body.result.unwrap_or(Value::Null))
    }

    async fn request_string(&self, method: &str, params: Value) -> Result<String, TransportError> {
        match self.request(method, params).await? {
            Value::String(text) => Ok(text),
            other => Err(TransportError::SerializationError(format!(
                "{} returned non-string result: {}",
                method, other
            ))),
        }
    }
}

fn call_object(request: &CallRequest) -> Value {
    json!({
        "to": request.to.to_string(),
        "data": to_data(&request.data),
    })
}

fn decode<T: for<'de> Deserialize<'de>>(method: &str, value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value)
        .map_err(|e| TransportError::SerializationError(format!("{} result: {}", method, e)))
}

/// Map a receipt's `status` field.
fn receipt_status(receipt: &RpcReceipt) -> Result<TransactionStatus, TransportError> {
    let block = receipt
        .block_number
        .as_deref()
        .map(parse_quantity)
        .transpose()?
        .unwrap_or_default();
    match receipt.status.as_deref() {
        Some("0x1") => Ok(TransactionStatus::Confirmed { block }),
        Some(_) => Ok(TransactionStatus::Failed {
            reason: "transaction reverted".to_string(),
        }),
        // Pre-Byzantium receipts carry no status; inclusion is success.
        None => Ok(TransactionStatus::Confirmed { block }),
    }
}

/// Map a `wallet_getCallsStatus` result (numeric codes or legacy strings).
fn calls_status(result: RpcCallsStatus) -> Result<TransactionStatus, TransportError> {
    let code = match &result.status {
        Value::Number(n) => n.as_u64().unwrap_or_default(),
        Value::String(s) if s.eq_ignore_ascii_case("PENDING") => 100,
        Value::String(s) if s.eq_ignore_ascii_case("CONFIRMED") => 200,
        _ => 0,
    };

    match code {
        100..=199 => Ok(TransactionStatus::Pending),
        200..=299 => {
            for receipt in &result.receipts {
                if let TransactionStatus::Failed { reason } = receipt_status(receipt)? {
                    return Ok(TransactionStatus::Failed { reason });
                }
            }
            let block = result
                .receipts
                .last()
                .and_then(|r| r.block_number.as_deref())
                .map(parse_quantity)
                .transpose()?
                .unwrap_or_default();
            Ok(TransactionStatus::Confirmed { block })
        }
        _ => Ok(TransactionStatus::Failed {
            reason: format!("call bundle failed with status {}", result.status),
        }),
    }
}

#[async_trait]
impl BlockchainTransport for JsonRpcTransport {
    async fn chain_id(&self) -> Result<u64, TransportError> {
        let text = self.request_string("eth_chainId", json!([])).await?;
        parse_quantity(&text)
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, TransportError> {
        let text = self
            .request_string("eth_call", json!([call_object(request), "latest"]))
            .await?;
        parse_data(&text)
    }

    async fn send_transaction(
        &self,
        from: Address,
        request: &CallRequest,
    ) -> Result<TxHash, TransportError> {
        let mut tx = call_object(request);
        tx["from"] = Value::String(from.to_string());
        let text = self.request_string("eth_sendTransaction", json!([tx])).await?;
        parse_tx_hash(&text)
    }

    async fn send_calls(
        &self,
        from: Address,
        chain_id: u64,
        calls: &[CallRequest],
    ) -> Result<TxHash, TransportError> {
        let calls: Vec<Value> = calls
            .iter()
            .map(|call| {
                json!({
                    "to": call.to.to_string(),
                    "data": to_data(&call.data),
                    "value": "0x0",
                })
            })
            .collect();
        let params = json!([{
            "version": "2.0.0",
            "chainId": to_quantity(chain_id),
            "from": from.to_string(),
            "atomicRequired": true,
            "calls": calls,
        }]);

        // Wallets answer either with the bundle id or with `{ "id": ... }`.
        match self.request("wallet_sendCalls", params).await? {
            Value::String(id) => parse_tx_hash(&id),
            Value::Object(object) => match object.get("id") {
                Some(Value::String(id)) => parse_tx_hash(id),
                _ => Err(TransportError::SerializationError(
                    "wallet_sendCalls result has no id".to_string(),
                )),
            },
            other => Err(TransportError::SerializationError(format!(
                "wallet_sendCalls returned {}",
                other
            ))),
        }
    }

    async fn query_transaction(&self, tx: &TxHash) -> Result<TransactionStatus, TransportError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx.to_hex()]))
            .await?;
        if result.is_null() {
            return Ok(TransactionStatus::Pending);
        }
        let receipt: RpcReceipt = decode("eth_getTransactionReceipt", result)?;
        receipt_status(&receipt)
    }

    async fn query_calls(&self, bundle: &TxHash) -> Result<TransactionStatus, TransportError> {
        let result = self
            .request("wallet_getCallsStatus", json!([bundle.to_hex()]))
            .await?;
        calls_status(decode("wallet_getCallsStatus", result)?)
    }

    async fn block_number(&self) -> Result<u64, TransportError> {
        let text = self.request_string("eth_blockNumber", json!([])).await?;
        parse_quantity(&text)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, TransportError> {
        let params = json!([{
            "address": filter.address.to_string(),
            "fromBlock": to_quantity(filter.from_block),
            "toBlock": to_quantity(filter.to_block),
        }]);
        let logs: Vec<RpcLog> = decode("eth_getLogs", self.request("eth_getLogs", params).await?)?;

        logs.into_iter()
            .map(|log| -> Result<LogEntry, TransportError> {
                Ok(LogEntry {
                    address: parse_address(&log.address)?,
                    topics: log
                        .topics
                        .iter()
                        .map(|t| parse_word(t))
                        .collect::<Result<Vec<_>, TransportError>>()?,
                    data: parse_data(&log.data)?,
                    block_number: log
                        .block_number
                        .as_deref()
                        .map(parse_quantity)
                        .transpose()?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }
}

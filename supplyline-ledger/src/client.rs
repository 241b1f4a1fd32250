//! Ledger client trait and its JSON-RPC implementation.
//!
//! The pipeline constructs one client at process start and shares it by
//! reference across all workers; nothing re-initializes it implicitly. The
//! client owns its own request timeout, so a hung node surfaces to callers
//! as an ordinary transport error.

use crate::topics::{TopicError, function_selector};
use crate::types::{ContractCall, LogFilter, RawLogEntry};
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use url::Url;

/// Gas limit used for submitted contract calls.
const CALL_GAS_LIMIT: u64 = 2_000_000;

/// Errors reaching or talking to the ledger node.
///
/// All variants are transient from the pipeline's point of view: a failed
/// cycle leaves the cursor unchanged and the same range is retried.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport or timeout failure.
    #[error("ledger unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something we could not interpret.
    #[error("malformed ledger response: {0}")]
    Response(String),

    /// The contract call could not be encoded.
    #[error("invalid contract call: {0}")]
    Call(#[from] TopicError),
}

/// The shape of the external ledger this subsystem depends on.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current chain height.
    async fn block_number(&self) -> Result<u64, LedgerError>;

    /// Logs matching `filter`, in block order.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError>;

    /// Submit a contract call on behalf of `sender`, returning the
    /// transaction hash. Signing is the node's concern, not ours.
    async fn submit_transaction(
        &self,
        call: ContractCall,
        sender: Address,
    ) -> Result<B256, LedgerError>;
}

/// JSON-RPC 2.0 client over HTTP.
pub struct HttpLedgerClient {
    endpoint: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    block_number: String,
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl HttpLedgerClient {
    /// Fails when the HTTP client cannot be built; a client without its
    /// request timeout is not an acceptable fallback.
    pub fn new(endpoint: Url) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { endpoint, http })
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self.http.post(self.endpoint.clone()).json(&body).send().await?;
        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        envelope
            .result
            .ok_or_else(|| LedgerError::Response(format!("{method} returned no result")))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn block_number(&self) -> Result<u64, LedgerError> {
        let height: String = self.rpc("eth_blockNumber", json!([])).await?;
        parse_quantity(&height)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLogEntry>, LedgerError> {
        let to_block = match filter.to_block {
            Some(block) => quantity(block),
            None => "latest".to_string(),
        };
        let params = json!([{
            "fromBlock": quantity(filter.from_block),
            "toBlock": to_block,
            "address": filter.address,
            "topics": [filter.topic0],
        }]);
        let logs: Vec<RpcLog> = self.rpc("eth_getLogs", params).await?;
        logs.into_iter()
            .map(|log| {
                Ok(RawLogEntry {
                    block_number: parse_quantity(&log.block_number)?,
                    address: log.address,
                    topics: log.topics,
                    data: log.data,
                })
            })
            .collect()
    }

    async fn submit_transaction(
        &self,
        call: ContractCall,
        sender: Address,
    ) -> Result<B256, LedgerError> {
        let data = call_data(&call)?;
        tracing::debug!(
            function = call.function,
            to = %call.to,
            from = %sender,
            "submitting contract call"
        );
        let params = json!([{
            "from": sender,
            "to": call.to,
            "gas": quantity(CALL_GAS_LIMIT),
            "data": data,
        }]);
        self.rpc("eth_sendTransaction", params).await
    }
}

/// ABI-encode a call: four-byte selector followed by one word per argument.
fn call_data(call: &ContractCall) -> Result<Bytes, LedgerError> {
    let selector = function_selector(&call.signature())?;
    let mut data = Vec::with_capacity(4 + call.args.len() * 32);
    data.extend_from_slice(&selector);
    for arg in &call.args {
        data.extend_from_slice(&arg.encode());
    }
    Ok(Bytes::from(data))
}

/// Format a u64 as a 0x-prefixed hex quantity.
fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Parse a 0x-prefixed hex quantity.
fn parse_quantity(value: &str) -> Result<u64, LedgerError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::Response(format!("quantity without 0x prefix: {value}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|_| LedgerError::Response(format!("unparseable quantity: {value}")))
}

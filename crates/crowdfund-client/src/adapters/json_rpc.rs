//! JSON-RPC Ledger Adapter
//!
//! Implements the `LedgerRpc` port over HTTP JSON-RPC 2.0.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::abi::revert_reason;
use crate::domain::ContractError;
use crate::ports::{LedgerRpc, TransactionReceipt, TransactionRequest};

const NO_PARAMS: [(); 0] = [];

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    /// Always "2.0"
    pub jsonrpc: &'static str,
    /// Method name
    pub method: String,
    /// Positional parameters
    pub params: T,
    /// Request id
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    /// Build a request.
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    /// Echoed request id
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Result on success
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error on failure
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Extra data (revert payload for reverted calls)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

impl JsonRpcResponse {
    /// Reject a response that answers a different request.
    ///
    /// A missing or `null` id is accepted; nodes send it for errors raised
    /// before the request id could be read.
    pub fn ensure_id(&self, expected: u64) -> Result<(), ContractError> {
        match &self.id {
            None | Some(serde_json::Value::Null) => Ok(()),
            Some(id) if id.as_u64() == Some(expected) => Ok(()),
            Some(id) => Err(ContractError::Decode(format!(
                "response id {} does not match request id {}",
                id, expected
            ))),
        }
    }

    /// Split into the decoded result or the RPC error object.
    ///
    /// A `null` result decodes into `R` as-is, so `Option<_>` results map
    /// to `None`.
    pub fn into_result<R: DeserializeOwned>(
        self,
    ) -> Result<Result<R, JsonRpcError>, ContractError> {
        if let Some(error) = self.error {
            return Ok(Err(error));
        }
        let value = self.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value)
            .map(Ok)
            .map_err(|e| ContractError::Decode(format!("unexpected result shape: {}", e)))
    }
}

/// Map an RPC error object onto the client taxonomy.
pub fn classify_rpc_error(error: &JsonRpcError) -> ContractError {
    match error.code {
        // EIP-1193: user rejected / unauthorized
        4001 | 4100 => ContractError::WalletUnavailable(error.message.clone()),
        _ if error.code == 3 || error.message.to_lowercase().contains("revert") => {
            ContractError::ExecutionReverted {
                reason: revert_data(error.data.as_ref())
                    .and_then(|data| revert_reason(&data))
                    .or_else(|| reason_from_message(&error.message)),
            }
        }
        _ => ContractError::Network(error.to_string()),
    }
}

/// Revert data is either a hex string or nested as `{ "data": "0x.." }`.
fn revert_data(data: Option<&serde_json::Value>) -> Option<Vec<u8>> {
    let hex_str = match data? {
        serde_json::Value::String(s) => s.as_str(),
        serde_json::Value::Object(map) => map.get("data")?.as_str()?,
        _ => return None,
    };
    hex::decode(hex_str.trim_start_matches("0x")).ok()
}

fn reason_from_message(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    let idx = lower.find("execution reverted: ")?;
    let reason = message[idx + "execution reverted: ".len()..].trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

/// HTTP JSON-RPC ledger client.
pub struct HttpLedgerRpc {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl HttpLedgerRpc {
    /// Create a new client for `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ContractError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method, keeping the RPC error object intact.
    async fn request_raw<P, R>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Result<R, JsonRpcError>, ContractError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id();
        debug!("[crowdfund] -> {} (id {})", method, id);
        let request = JsonRpcRequest::new(method, params, id);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ContractError::Network(format!("Cannot connect to {}", self.url))
                } else if e.is_timeout() {
                    ContractError::Network(format!("Request to {} timed out", self.url))
                } else {
                    ContractError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::Network(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ContractError::Decode(e.to_string()))?;

        rpc_response.ensure_id(id)?;
        rpc_response.into_result()
    }

    /// Call a JSON-RPC method.
    async fn request<P, R>(&self, method: &str, params: P) -> Result<R, ContractError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        self.request_raw(method, params).await?.map_err(|e| {
            let err = classify_rpc_error(&e);
            debug!("[crowdfund] <- {} failed: {}", method, e);
            err
        })
    }
}

#[async_trait]
impl LedgerRpc for HttpLedgerRpc {
    async fn chain_id(&self) -> Result<u64, ContractError> {
        let id: U64 = self.request("eth_chainId", NO_PARAMS).await?;
        Ok(id.to::<u64>())
    }

    async fn block_number(&self) -> Result<u64, ContractError> {
        let number: U64 = self.request("eth_blockNumber", NO_PARAMS).await?;
        Ok(number.to::<u64>())
    }

    async fn accounts(&self, request: bool) -> Result<Vec<Address>, ContractError> {
        if !request {
            return self.request("eth_accounts", NO_PARAMS).await;
        }

        match self.request_raw("eth_requestAccounts", NO_PARAMS).await? {
            Ok(accounts) => Ok(accounts),
            Err(e) if e.code == METHOD_NOT_FOUND => {
                warn!(
                    "[crowdfund] eth_requestAccounts unsupported by {}, using eth_accounts",
                    self.url
                );
                self.request("eth_accounts", NO_PARAMS).await
            }
            Err(e) => Err(classify_rpc_error(&e)),
        }
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ContractError> {
        self.request("eth_call", (tx, "latest")).await
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, ContractError> {
        self.request("eth_estimateGas", (tx,)).await
    }

    async fn gas_price(&self) -> Result<U256, ContractError> {
        self.request("eth_gasPrice", NO_PARAMS).await
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ContractError> {
        let count: U64 = self
            .request("eth_getTransactionCount", (address, "pending"))
            .await?;
        Ok(count.to::<u64>())
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, ContractError> {
        self.request("eth_sendTransaction", (tx,)).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, ContractError> {
        self.request("eth_sendRawTransaction", (raw,)).await
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ContractError> {
        self.request("eth_getTransactionReceipt", (hash,)).await
    }
}

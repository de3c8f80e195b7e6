//! # Outbound Ports
//!
//! Traits for external dependencies: the ledger RPC endpoint and the
//! wallet session that signs transactions.

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ContractError;

/// Transaction or call object (`eth_call`, `eth_estimateGas`,
/// `eth_sendTransaction`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Sender address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Target address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Gas limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    /// Gas price (legacy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// Value to transfer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Input data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Nonce
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,
}

impl TransactionRequest {
    /// Call `to` with `data`.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Set the sender.
    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Attach a value transfer.
    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// Subset of `eth_getTransactionReceipt` the client relies on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction hash
    pub transaction_hash: TxHash,
    /// Including block (absent while pending on some nodes)
    #[serde(default)]
    pub block_number: Option<U64>,
    /// 1 = success, 0 = reverted
    #[serde(default)]
    pub status: Option<U64>,
    /// Gas used
    #[serde(default)]
    pub gas_used: Option<U256>,
}

impl TransactionReceipt {
    /// Whether execution succeeded. Receipts without a status field
    /// (pre-Byzantium) count as success.
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| !s.is_zero()).unwrap_or(true)
    }

    /// Block number as `u64`.
    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|b| b.to::<u64>())
    }

    /// Gas used as `u64`.
    pub fn gas_used_u64(&self) -> Option<u64> {
        self.gas_used.and_then(|g| u64::try_from(g).ok())
    }
}

/// Ledger RPC client - outbound port.
///
/// Mirrors the standard `eth_*` JSON-RPC methods the client needs.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> Result<u64, ContractError>;

    /// `eth_blockNumber`
    async fn block_number(&self) -> Result<u64, ContractError>;

    /// `eth_requestAccounts` when `request` is set, otherwise `eth_accounts`.
    async fn accounts(&self, request: bool) -> Result<Vec<Address>, ContractError>;

    /// `eth_call` against the latest block.
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ContractError>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, ContractError>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> Result<U256, ContractError>;

    /// `eth_getTransactionCount` at the pending block.
    async fn transaction_count(&self, address: Address) -> Result<u64, ContractError>;

    /// `eth_sendTransaction` (node-side signing).
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, ContractError>;

    /// `eth_sendRawTransaction`
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, ContractError>;

    /// `eth_getTransactionReceipt`
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ContractError>;
}

/// Wallet session provider - outbound port.
///
/// Owns the signing identity. The adapter only borrows it for the
/// duration of a call.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Address of the active session, if any.
    fn active_address(&self) -> Option<Address>;

    /// Establish a session and return its address.
    async fn connect(&self, rpc: &dyn LedgerRpc) -> Result<Address, ContractError>;

    /// Account the session would sign with right now.
    ///
    /// Re-reads the provider, so an account switch since `connect` is
    /// picked up. `WalletUnavailable` when not connected or when the
    /// provider no longer exposes an account.
    async fn current_address(&self, rpc: &dyn LedgerRpc) -> Result<Address, ContractError>;

    /// Sign (or have signed) and broadcast a transaction.
    ///
    /// `tx.from` is filled with the session address when absent.
    async fn send_transaction(
        &self,
        rpc: &dyn LedgerRpc,
        tx: TransactionRequest,
    ) -> Result<TxHash, ContractError>;

    /// Short identifier for logs.
    fn kind(&self) -> &'static str;
}

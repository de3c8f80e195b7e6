//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ports: JSON-RPC transport, wallet sessions and
//! an in-process ledger for demos and tests.

mod json_rpc;
mod local_wallet;
mod memory;
mod node_wallet;

pub use json_rpc::{classify_rpc_error, HttpLedgerRpc, JsonRpcError};
pub use local_wallet::{address_of, LegacyTransaction, LocalKeyWallet};
pub use memory::{InMemoryLedger, DEV_CHAIN_ID};
pub use node_wallet::NodeWallet;

//! # Ports
//!
//! Inbound: the adapter API consumed by front-ends.
//! Outbound: the ledger RPC client and wallet session it depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::CrowdfundingApi;
pub use outbound::{LedgerRpc, TransactionReceipt, TransactionRequest, WalletSession};

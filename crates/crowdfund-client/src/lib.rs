//! # Crowdfund Client
//!
//! Client-side binding for the deployed `CrowdFunding` contract.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Expose the contract's four entry points to a front-end through a
//! wallet-connected provider:
//! - create a campaign
//! - list campaigns
//! - donate to a campaign
//! - list the donations of a campaign
//!
//! All validation and persistence happen inside the contract. This crate
//! builds the calls, waits for confirmation and turns ledger-native
//! 18-decimal integers into decimal strings.
//!
//! ## Module Structure
//!
//! ```text
//! crowdfund-client/
//! ├── abi.rs           # CrowdFunding interface description (sol!)
//! ├── domain/          # Campaign, Donation, units, decoding, errors
//! ├── ports/           # API trait (inbound) + ledger/wallet traits (outbound)
//! ├── adapters/        # JSON-RPC client, wallets, in-memory ledger
//! ├── application/     # Contract handle, confirmation wait, adapter service
//! └── config.rs        # ClientConfig
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use crowdfund_client::{
//!     ClientConfig, ContractClientAdapter, CrowdfundingApi, HttpLedgerRpc, NodeWallet,
//! };
//!
//! # async fn run() -> Result<(), crowdfund_client::ContractError> {
//! let config = ClientConfig::default();
//! let rpc = Arc::new(HttpLedgerRpc::new(&config.rpc_url, config.request_timeout())?);
//! let adapter = ContractClientAdapter::new(config, rpc, Arc::new(NodeWallet::new()));
//!
//! adapter.connect().await?;
//! for campaign in adapter.get_campaigns().await? {
//!     println!("#{} {} ({} / {})", campaign.p_id, campaign.title,
//!         campaign.amount_collected, campaign.target);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{HttpLedgerRpc, InMemoryLedger, LocalKeyWallet, NodeWallet};
pub use application::{ContractClientAdapter, CrowdFundingContract};
pub use config::ClientConfig;
pub use domain::{
    format_ether, parse_ether, parse_deadline_millis, CallOptions, Campaign, CampaignForm,
    ConfirmedTx, ContractError, Donation, ErrorKind, ETHER_DECIMALS,
};
pub use ports::{CrowdfundingApi, LedgerRpc, TransactionReceipt, TransactionRequest, WalletSession};

pub use alloy_primitives::{Address, TxHash, U256};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

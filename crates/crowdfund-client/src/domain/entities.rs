//! # Domain Entities
//!
//! Plain records handed to the front-end, plus per-call options.

use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A campaign as decoded from the ledger.
///
/// `target` and `amount_collected` are decimal ether strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Campaign owner.
    pub owner: Address,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Funding target (ether).
    pub target: String,
    /// Deadline as stored on the ledger.
    pub deadline: u64,
    /// Total donated so far (ether).
    pub amount_collected: String,
    /// Image URI.
    pub image: String,
    /// Zero-based index in the contract's campaign list.
    #[serde(rename = "pId")]
    pub p_id: usize,
}

/// A single donation to a campaign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    /// Donor address.
    pub donator: Address,
    /// Donated amount (ether).
    pub donation: String,
}

/// Campaign creation form as entered by a user.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CampaignForm {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Target in ether, e.g. `"10"` or `"0.5"`.
    pub target: String,
    /// Deadline date, e.g. `"2026-12-31"`.
    pub deadline: String,
    /// Image URI.
    pub image: String,
}

/// A transaction that reached the requested number of confirmations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedTx {
    /// Transaction hash.
    pub hash: TxHash,
    /// Block that included the transaction.
    pub block_number: u64,
    /// Gas used, if the node reported it.
    pub gas_used: Option<u64>,
}

/// Per-call options for state-changing operations.
///
/// `cancel` follows the shutdown-channel convention: the wait aborts as
/// soon as the watched value becomes `true`.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    /// Upper bound on the confirmation wait.
    pub timeout: Option<Duration>,
    /// Cancellation signal.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl CallOptions {
    /// Options with a timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancel: None,
        }
    }

    /// Attach a cancellation signal.
    pub fn cancel_on(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

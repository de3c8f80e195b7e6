//! # Inbound Ports
//!
//! API trait exposed to front-ends.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::{CallOptions, Campaign, CampaignForm, ConfirmedTx, ContractError, Donation};

/// Crowdfunding contract API.
///
/// Every call is independent: nothing is cached between calls and each
/// one issues its own network traffic.
#[async_trait]
pub trait CrowdfundingApi: Send + Sync {
    /// Connect the wallet session and return the active address.
    async fn connect(&self) -> Result<Address, ContractError>;

    /// Address of the current session, if connected.
    fn active_address(&self) -> Option<Address>;

    /// Create a campaign owned by the active address.
    async fn submit_campaign(
        &self,
        form: &CampaignForm,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError>;

    /// List every campaign, `p_id` in ledger order.
    async fn get_campaigns(&self) -> Result<Vec<Campaign>, ContractError>;

    /// Donate `amount` ether to campaign `p_id`.
    async fn donate(
        &self,
        p_id: usize,
        amount: &str,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError>;

    /// List the donations made to campaign `p_id`.
    async fn get_donations(&self, p_id: usize) -> Result<Vec<Donation>, ContractError>;
}

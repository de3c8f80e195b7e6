//! # Contract Client Adapter
//!
//! Application service behind [`CrowdfundingApi`]. Converts user input
//! into contract calls, waits for confirmation and decodes ledger data into
//! domain records. Failures are logged and returned, never swallowed.

use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tracing::{error, info, instrument};

use super::confirm::{wait_for_confirmation, ConfirmationPolicy};
use super::contract::CrowdFundingContract;
use crate::config::ClientConfig;
use crate::domain::{
    decode_campaigns, parse_deadline_millis, parse_ether, zip_donations, CallOptions, Campaign,
    CampaignForm, ConfirmedTx, ContractError, Donation,
};
use crate::ports::{CrowdfundingApi, LedgerRpc, WalletSession};

/// Crowdfunding contract client.
pub struct ContractClientAdapter {
    config: ClientConfig,
    rpc: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSession>,
}

impl ContractClientAdapter {
    /// Create a client from its configuration, transport and wallet.
    pub fn new(
        config: ClientConfig,
        rpc: Arc<dyn LedgerRpc>,
        wallet: Arc<dyn WalletSession>,
    ) -> Self {
        Self {
            config,
            rpc,
            wallet,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fresh contract handle bound to the current session.
    pub fn contract(&self) -> CrowdFundingContract<'_> {
        CrowdFundingContract::new(
            self.rpc.as_ref(),
            self.wallet.as_ref(),
            self.config.contract_address,
        )
    }

    fn policy(&self, options: &CallOptions) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirmations: self.config.confirmations,
            poll_interval: self.config.poll_interval(),
            timeout: options.timeout.or_else(|| self.config.confirmation_timeout()),
        }
    }

    /// Account currently behind the session, re-read on every send.
    async fn current_session(&self) -> Result<Address, ContractError> {
        self.wallet.current_address(self.rpc.as_ref()).await
    }

    async fn confirm(
        &self,
        hash: TxHash,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError> {
        let policy = self.policy(&options);
        wait_for_confirmation(self.rpc.as_ref(), hash, &policy, options.cancel).await
    }

    async fn create(
        &self,
        form: &CampaignForm,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError> {
        let target = parse_ether(&form.target)?;
        let deadline = parse_deadline_millis(&form.deadline)?;
        let owner = self.current_session().await?;

        let hash = self
            .contract()
            .create_campaign(
                owner,
                &form.title,
                &form.description,
                target,
                U256::from(deadline),
                &form.image,
            )
            .await?;
        info!("[crowdfund] createCampaign submitted: {}", hash);

        self.confirm(hash, options).await
    }

    async fn donate_inner(
        &self,
        p_id: usize,
        amount: &str,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError> {
        let value = parse_ether(amount)?;

        let hash = self
            .contract()
            .donate_to_campaign(U256::from(p_id), value)
            .await?;
        info!("[crowdfund] donateToCampaign({}) submitted: {}", p_id, hash);

        self.confirm(hash, options).await
    }

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, ContractError> {
        decode_campaigns(self.contract().get_campaigns().await?)
    }

    async fn fetch_donations(&self, p_id: usize) -> Result<Vec<Donation>, ContractError> {
        let (donators, amounts) = self.contract().get_donators(U256::from(p_id)).await?;
        zip_donations(donators, amounts)
    }
}

/// Log a failed operation before handing it back.
fn logged<T>(operation: &str, result: Result<T, ContractError>) -> Result<T, ContractError> {
    if let Err(e) = &result {
        error!("[crowdfund] {} failed ({:?}): {}", operation, e.kind(), e);
    }
    result
}

#[async_trait]
impl CrowdfundingApi for ContractClientAdapter {
    #[instrument(skip(self), fields(wallet = self.wallet.kind()))]
    async fn connect(&self) -> Result<Address, ContractError> {
        logged("connect", self.wallet.connect(self.rpc.as_ref()).await)
    }

    fn active_address(&self) -> Option<Address> {
        self.wallet.active_address()
    }

    #[instrument(skip(self, form, options), fields(title = %form.title))]
    async fn submit_campaign(
        &self,
        form: &CampaignForm,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError> {
        let result = self.create(form, options).await;
        if let Ok(confirmed) = &result {
            info!(
                "[crowdfund] Campaign created in block {}",
                confirmed.block_number
            );
        }
        logged("submitCampaign", result)
    }

    #[instrument(skip(self))]
    async fn get_campaigns(&self) -> Result<Vec<Campaign>, ContractError> {
        logged("getCampaigns", self.fetch_campaigns().await)
    }

    #[instrument(skip(self, options))]
    async fn donate(
        &self,
        p_id: usize,
        amount: &str,
        options: CallOptions,
    ) -> Result<ConfirmedTx, ContractError> {
        logged("donate", self.donate_inner(p_id, amount, options).await)
    }

    #[instrument(skip(self))]
    async fn get_donations(&self, p_id: usize) -> Result<Vec<Donation>, ContractError> {
        logged("getDonations", self.fetch_donations(p_id).await)
    }
}

//! # Contract Handle
//!
//! Typed access to the deployed `CrowdFunding` contract. A handle borrows
//! the RPC client and the wallet session, so building one per call is free
//! and always reflects the current session.

use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::abi::CrowdFunding;
use crate::domain::{gas_with_headroom, ContractError};
use crate::ports::{LedgerRpc, TransactionRequest, WalletSession};

/// Handle to a `CrowdFunding` deployment.
pub struct CrowdFundingContract<'a> {
    rpc: &'a dyn LedgerRpc,
    wallet: &'a dyn WalletSession,
    address: Address,
}

impl<'a> CrowdFundingContract<'a> {
    /// Bind to the contract at `address`.
    pub fn new(rpc: &'a dyn LedgerRpc, wallet: &'a dyn WalletSession, address: Address) -> Self {
        Self {
            rpc,
            wallet,
            address,
        }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Read-only call against the latest block.
    pub async fn view<C: SolCall>(&self, call: &C) -> Result<C::Return, ContractError> {
        let mut tx = TransactionRequest::call(self.address, call.abi_encode());
        tx.from = self.wallet.active_address();

        let output = self.rpc.call(&tx).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    /// State-changing call from the session's current account.
    ///
    /// Gas is estimated first, so a call that would revert fails here with
    /// its reason instead of being broadcast.
    pub async fn send<C: SolCall>(&self, call: &C, value: U256) -> Result<TxHash, ContractError> {
        let from = self.wallet.current_address(self.rpc).await?;

        let mut tx = TransactionRequest::call(self.address, call.abi_encode()).sender(from);
        if !value.is_zero() {
            tx = tx.value(value);
        }

        let estimate = self.rpc.estimate_gas(&tx).await?;
        tx.gas = Some(gas_with_headroom(estimate));
        debug!(
            "[crowdfund] {} from {} (gas estimate {})",
            C::SIGNATURE,
            from,
            estimate
        );

        self.wallet.send_transaction(self.rpc, tx).await
    }

    /// `createCampaign(owner, title, description, target, deadline, image)`
    pub async fn create_campaign(
        &self,
        owner: Address,
        title: &str,
        description: &str,
        target: U256,
        deadline: U256,
        image: &str,
    ) -> Result<TxHash, ContractError> {
        let call = CrowdFunding::createCampaignCall {
            owner,
            title: title.to_string(),
            description: description.to_string(),
            target,
            deadline,
            image: image.to_string(),
        };
        self.send(&call, U256::ZERO).await
    }

    /// `donateToCampaign(id)` carrying `value` wei.
    pub async fn donate_to_campaign(&self, id: U256, value: U256) -> Result<TxHash, ContractError> {
        self.send(&CrowdFunding::donateToCampaignCall { id }, value)
            .await
    }

    /// `getDonators(id)`: donor addresses and amounts, positionally.
    pub async fn get_donators(&self, id: U256) -> Result<(Vec<Address>, Vec<U256>), ContractError> {
        let ret = self.view(&CrowdFunding::getDonatorsCall { id }).await?;
        Ok((ret._0, ret._1))
    }

    /// `getCampaigns()`
    pub async fn get_campaigns(&self) -> Result<Vec<CrowdFunding::Campaign>, ContractError> {
        Ok(self.view(&CrowdFunding::getCampaignsCall {}).await?._0)
    }
}

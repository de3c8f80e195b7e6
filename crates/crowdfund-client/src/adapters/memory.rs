//! In-Memory Ledger Adapter
//!
//! Simulates a development node with the `CrowdFunding` contract deployed.
//! Used by demo mode and tests. Transactions are signed by the node
//! (`eth_sendTransaction`) from a fixed set of dev accounts.

use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use alloy_sol_types::{SolCall, SolInterface};
use async_trait::async_trait;
use parking_lot::RwLock;
use sha3::{Digest, Keccak256};
use tracing::{debug, info, warn};

use crate::abi::CrowdFunding::{self, CrowdFundingCalls};
use crate::config::{parse_address, DEFAULT_CONTRACT_ADDRESS};
use crate::domain::ContractError;
use crate::ports::{LedgerRpc, TransactionReceipt, TransactionRequest};

/// Hardhat/Anvil dev chain id.
pub const DEV_CHAIN_ID: u64 = 31337;

const BASE_GAS: u64 = 21_000;
const GAS_PER_DATA_BYTE: u64 = 16;
const DEV_GAS_PRICE: u64 = 1_000_000_000;

/// Stored campaign.
#[derive(Clone, Debug)]
struct CampaignRecord {
    owner: Address,
    title: String,
    description: String,
    target: U256,
    deadline: U256,
    amount_collected: U256,
    image: String,
    donators: Vec<Address>,
    donations: Vec<U256>,
}

impl CampaignRecord {
    fn to_abi(&self) -> CrowdFunding::Campaign {
        CrowdFunding::Campaign {
            owner: self.owner,
            title: self.title.clone(),
            description: self.description.clone(),
            target: self.target,
            deadline: self.deadline,
            amountCollected: self.amount_collected,
            image: self.image.clone(),
            donators: self.donators.clone(),
            donations: self.donations.clone(),
        }
    }
}

/// Transaction waiting for the next block.
#[derive(Clone, Debug)]
struct PendingTx {
    hash: TxHash,
    from: Address,
    to: Option<Address>,
    value: U256,
    data: Bytes,
}

#[derive(Debug)]
struct LedgerState {
    accounts: Vec<Address>,
    block_number: u64,
    /// Wall-clock offset applied to block timestamps, in milliseconds.
    clock_offset_ms: i64,
    auto_mine: bool,
    offline: bool,
    campaigns: Vec<CampaignRecord>,
    pending: Vec<PendingTx>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    nonces: HashMap<Address, u64>,
    tx_counter: u64,
}

impl LedgerState {
    fn timestamp_ms(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis() + self.clock_offset_ms;
        u64::try_from(now).unwrap_or(0)
    }

    /// Run a call against the contract. State is only modified when
    /// `commit` is set and the call succeeds.
    fn execute(
        &mut self,
        contract: Address,
        from: Address,
        to: Option<Address>,
        value: U256,
        data: &[u8],
        commit: bool,
    ) -> Result<Vec<u8>, ContractError> {
        if to != Some(contract) {
            // Plain transfer or call to an account without code
            return Ok(Vec::new());
        }

        let call =
            CrowdFundingCalls::abi_decode(data, true).map_err(|_| ContractError::reverted())?;

        match call {
            CrowdFundingCalls::createCampaign(c) => {
                if c.deadline <= U256::from(self.timestamp_ms()) {
                    return Err(ContractError::reverted_with(
                        "The deadline should be a date in the future.",
                    ));
                }
                let id = self.campaigns.len();
                if commit {
                    self.campaigns.push(CampaignRecord {
                        owner: c.owner,
                        title: c.title,
                        description: c.description,
                        target: c.target,
                        deadline: c.deadline,
                        amount_collected: U256::ZERO,
                        image: c.image,
                        donators: Vec::new(),
                        donations: Vec::new(),
                    });
                }
                Ok(CrowdFunding::createCampaignCall::abi_encode_returns(&(U256::from(id),)))
            }
            CrowdFundingCalls::donateToCampaign(c) => {
                let campaign = self.campaign_mut(c.id)?;
                if commit {
                    campaign.donators.push(from);
                    campaign.donations.push(value);
                    campaign.amount_collected += value;
                }
                Ok(Vec::new())
            }
            CrowdFundingCalls::getDonators(c) => {
                // Unknown ids read as empty storage
                let (donators, donations) = self
                    .campaign_mut(c.id)
                    .map(|campaign| (campaign.donators.clone(), campaign.donations.clone()))
                    .unwrap_or_default();
                Ok(CrowdFunding::getDonatorsCall::abi_encode_returns(&(
                    donators, donations,
                )))
            }
            CrowdFundingCalls::getCampaigns(_) => {
                let all: Vec<_> = self.campaigns.iter().map(CampaignRecord::to_abi).collect();
                Ok(CrowdFunding::getCampaignsCall::abi_encode_returns(&(all,)))
            }
        }
    }

    fn campaign_mut(&mut self, id: U256) -> Result<&mut CampaignRecord, ContractError> {
        if id >= U256::from(self.campaigns.len()) {
            return Err(ContractError::reverted_with("Campaign does not exist"));
        }
        Ok(&mut self.campaigns[id.to::<usize>()])
    }

    /// Include every pending transaction in a new block.
    fn mine(&mut self, contract: Address) {
        self.block_number += 1;
        let block = self.block_number;

        for tx in std::mem::take(&mut self.pending) {
            let succeeded = self
                .execute(contract, tx.from, tx.to, tx.value, &tx.data, true)
                .map_err(|e| debug!("[crowdfund] Simulated tx {} failed: {}", tx.hash, e))
                .is_ok();

            self.receipts.insert(
                tx.hash,
                TransactionReceipt {
                    transaction_hash: tx.hash,
                    block_number: Some(U64::from(block)),
                    status: Some(U64::from(u64::from(succeeded))),
                    gas_used: Some(U256::from(gas_for(&tx.data))),
                },
            );
        }
    }
}

fn gas_for(data: &[u8]) -> u64 {
    BASE_GAS + GAS_PER_DATA_BYTE * data.len() as u64
}

/// In-process ledger with the `CrowdFunding` contract deployed.
pub struct InMemoryLedger {
    contract: Address,
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Ledger with three funded dev accounts and the contract at the
    /// default address.
    pub fn new() -> Self {
        Self::with_accounts((1u8..=3).map(|i| Address::repeat_byte(i * 0x11)).collect())
    }

    /// Ledger exposing the given accounts.
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        let contract = parse_address(DEFAULT_CONTRACT_ADDRESS).unwrap_or_default();
        Self {
            contract,
            state: RwLock::new(LedgerState {
                accounts,
                block_number: 1,
                clock_offset_ms: 0,
                auto_mine: true,
                offline: false,
                campaigns: Vec::new(),
                pending: Vec::new(),
                receipts: HashMap::new(),
                nonces: HashMap::new(),
                tx_counter: 0,
            }),
        }
    }

    /// Deploy the contract at `address` instead.
    pub fn at(mut self, address: Address) -> Self {
        self.contract = address;
        self
    }

    /// Contract address.
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    /// Accounts the node signs for.
    pub fn dev_accounts(&self) -> Vec<Address> {
        self.state.read().accounts.clone()
    }

    /// Replace the exposed accounts, as when the user switches accounts in
    /// their wallet.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.write().accounts = accounts;
    }

    /// Mine every sent transaction immediately (default), or hold them
    /// until [`mine_block`](Self::mine_block).
    pub fn set_auto_mine(&self, enabled: bool) {
        self.state.write().auto_mine = enabled;
    }

    /// Produce a block containing all pending transactions.
    pub fn mine_block(&self) {
        let mut state = self.state.write();
        state.mine(self.contract);
        debug!("[crowdfund] Simulated block {}", state.block_number);
    }

    /// Make every RPC call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        if offline {
            warn!("[crowdfund] Simulated ledger going offline");
        }
        self.state.write().offline = offline;
    }

    /// Shift the block clock forward.
    pub fn advance_time(&self, millis: i64) {
        self.state.write().clock_offset_ms += millis;
    }

    /// Current block timestamp in epoch milliseconds.
    pub fn timestamp_ms(&self) -> u64 {
        self.state.read().timestamp_ms()
    }

    /// Number of transactions waiting for a block.
    pub fn pending_count(&self) -> usize {
        self.state.read().pending.len()
    }

    fn ensure_online(&self) -> Result<(), ContractError> {
        if self.state.read().offline {
            return Err(ContractError::Network(
                "Cannot connect to in-memory ledger".to_string(),
            ));
        }
        Ok(())
    }

    fn dry_run(&self, tx: &TransactionRequest) -> Result<Vec<u8>, ContractError> {
        let mut state = self.state.write();
        let data = tx.data.clone().unwrap_or_default();
        state.execute(
            self.contract,
            tx.from.unwrap_or_default(),
            tx.to,
            tx.value.unwrap_or_default(),
            &data,
            false,
        )
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRpc for InMemoryLedger {
    async fn chain_id(&self) -> Result<u64, ContractError> {
        self.ensure_online()?;
        Ok(DEV_CHAIN_ID)
    }

    async fn block_number(&self) -> Result<u64, ContractError> {
        self.ensure_online()?;
        Ok(self.state.read().block_number)
    }

    async fn accounts(&self, _request: bool) -> Result<Vec<Address>, ContractError> {
        self.ensure_online()?;
        Ok(self.dev_accounts())
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ContractError> {
        self.ensure_online()?;
        self.dry_run(tx).map(Bytes::from)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, ContractError> {
        self.ensure_online()?;
        self.dry_run(tx)?;
        let data = tx.data.clone().unwrap_or_default();
        Ok(U256::from(gas_for(&data)))
    }

    async fn gas_price(&self) -> Result<U256, ContractError> {
        self.ensure_online()?;
        Ok(U256::from(DEV_GAS_PRICE))
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ContractError> {
        self.ensure_online()?;
        Ok(self.state.read().nonces.get(&address).copied().unwrap_or(0))
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, ContractError> {
        self.ensure_online()?;
        let mut state = self.state.write();

        let from = tx
            .from
            .filter(|from| state.accounts.contains(from))
            .ok_or_else(|| {
                ContractError::Network("RPC Error -32000: unknown account".to_string())
            })?;

        state.tx_counter += 1;
        *state.nonces.entry(from).or_insert(0) += 1;

        let data = tx.data.clone().unwrap_or_default();
        let mut hasher = Keccak256::new();
        hasher.update(state.tx_counter.to_be_bytes());
        hasher.update(from);
        hasher.update(&data);
        let hash = TxHash::from(<[u8; 32]>::from(hasher.finalize()));

        state.pending.push(PendingTx {
            hash,
            from,
            to: tx.to,
            value: tx.value.unwrap_or_default(),
            data,
        });
        info!("[crowdfund] Simulated ledger accepted tx {}", hash);

        if state.auto_mine {
            state.mine(self.contract);
        }
        Ok(hash)
    }

    async fn send_raw_transaction(&self, _raw: Bytes) -> Result<TxHash, ContractError> {
        self.ensure_online()?;
        Err(ContractError::Network(
            "RPC Error -32601: eth_sendRawTransaction not supported by in-memory ledger"
                .to_string(),
        ))
    }

    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ContractError> {
        self.ensure_online()?;
        Ok(self.state.read().receipts.get(&hash).cloned())
    }
}

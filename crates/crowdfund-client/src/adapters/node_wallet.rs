//! Node-managed wallet session.
//!
//! The endpoint holds the keys (browser provider, dev node with unlocked
//! accounts). Connecting asks it for accounts; sending uses
//! `eth_sendTransaction`.

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::ContractError;
use crate::ports::{LedgerRpc, TransactionRequest, WalletSession};

/// Wallet session backed by the node's own accounts.
#[derive(Debug, Default)]
pub struct NodeWallet {
    address: RwLock<Option<Address>>,
}

impl NodeWallet {
    /// Create an unconnected session.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletSession for NodeWallet {
    fn active_address(&self) -> Option<Address> {
        *self.address.read()
    }

    async fn connect(&self, rpc: &dyn LedgerRpc) -> Result<Address, ContractError> {
        let accounts = rpc.accounts(true).await?;
        let address = accounts.first().copied().ok_or_else(|| {
            ContractError::WalletUnavailable("endpoint exposes no accounts".to_string())
        })?;

        *self.address.write() = Some(address);
        info!("[crowdfund] Node wallet connected: {}", address);
        Ok(address)
    }

    async fn current_address(&self, rpc: &dyn LedgerRpc) -> Result<Address, ContractError> {
        let previous = self.active_address().ok_or_else(|| {
            ContractError::WalletUnavailable("connect a wallet before sending".to_string())
        })?;

        let current = rpc.accounts(false).await?.first().copied();
        *self.address.write() = current;

        match current {
            Some(address) => {
                if address != previous {
                    info!("[crowdfund] Node wallet switched {} -> {}", previous, address);
                }
                Ok(address)
            }
            None => Err(ContractError::WalletUnavailable(
                "endpoint no longer exposes an account".to_string(),
            )),
        }
    }

    async fn send_transaction(
        &self,
        rpc: &dyn LedgerRpc,
        mut tx: TransactionRequest,
    ) -> Result<TxHash, ContractError> {
        let address = self.active_address().ok_or_else(|| {
            ContractError::WalletUnavailable("wallet not connected".to_string())
        })?;
        tx.from.get_or_insert(address);

        let hash = rpc.send_transaction(&tx).await?;
        debug!("[crowdfund] Node signed and broadcast {}", hash);
        Ok(hash)
    }

    fn kind(&self) -> &'static str {
        "node"
    }
}

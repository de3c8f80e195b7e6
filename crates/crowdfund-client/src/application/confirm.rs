//! # Confirmation Wait
//!
//! Polls for the receipt of a broadcast transaction until it has the
//! requested depth, bounded by an optional timeout and an optional
//! cancellation signal.

use std::time::Duration;

use alloy_primitives::TxHash;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{ConfirmedTx, ContractError};
use crate::ports::LedgerRpc;

/// How long to wait and when to give up.
#[derive(Clone, Debug)]
pub struct ConfirmationPolicy {
    /// Required depth; values below 1 are treated as 1.
    pub confirmations: u64,
    /// Delay between polls.
    pub poll_interval: Duration,
    /// Upper bound on the whole wait.
    pub timeout: Option<Duration>,
}

/// Wait until `hash` is included and buried under `confirmations - 1`
/// further blocks.
///
/// Returns `ExecutionReverted` for a failed receipt, `Timeout` when the
/// policy's bound elapses and `Cancelled` once `cancel` becomes `true`.
pub async fn wait_for_confirmation(
    rpc: &dyn LedgerRpc,
    hash: TxHash,
    policy: &ConfirmationPolicy,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<ConfirmedTx, ContractError> {
    let bounded = async {
        match policy.timeout {
            Some(limit) => match tokio::time::timeout(limit, poll_receipt(rpc, hash, policy))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    warn!("[crowdfund] No confirmation for {} after {:?}", hash, limit);
                    Err(ContractError::Timeout(limit))
                }
            },
            None => poll_receipt(rpc, hash, policy).await,
        }
    };

    match cancel {
        Some(mut cancel) => {
            tokio::select! {
                result = bounded => result,
                _ = cancelled(&mut cancel) => {
                    debug!("[crowdfund] Confirmation wait for {} cancelled", hash);
                    Err(ContractError::Cancelled)
                }
            }
        }
        None => bounded.await,
    }
}

/// Resolves once the signal reads `true`. A dropped sender never cancels.
async fn cancelled(signal: &mut watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn poll_receipt(
    rpc: &dyn LedgerRpc,
    hash: TxHash,
    policy: &ConfirmationPolicy,
) -> Result<ConfirmedTx, ContractError> {
    let required = policy.confirmations.max(1);

    loop {
        if let Some(receipt) = rpc.transaction_receipt(hash).await? {
            if !receipt.succeeded() {
                return Err(ContractError::reverted());
            }

            if let Some(block) = receipt.block() {
                let depth = if required == 1 {
                    1
                } else {
                    rpc.block_number().await?.saturating_sub(block) + 1
                };

                if depth >= required {
                    return Ok(ConfirmedTx {
                        hash,
                        block_number: block,
                        gas_used: receipt.gas_used_u64(),
                    });
                }
                debug!("[crowdfund] {} at depth {}/{}", hash, depth, required);
            }
        }

        tokio::time::sleep(policy.poll_interval).await;
    }
}

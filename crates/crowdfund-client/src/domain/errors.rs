//! # Domain Errors
//!
//! Error types for the crowdfunding client.
//!
//! Every public operation returns one of these instead of logging and
//! swallowing the failure, so callers can render accurate UI state and
//! decide whether to retry.

use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a [`ContractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No signing session, or the wallet refused to provide one.
    WalletUnavailable,
    /// Transport or RPC-level failure.
    NetworkFailure,
    /// The ledger rejected the transaction's preconditions.
    ExecutionReverted,
    /// Malformed or unexpected response shape.
    DecodeFailure,
    /// Caller-supplied input could not be encoded.
    InvalidInput,
    /// The confirmation wait exceeded its deadline.
    Timeout,
    /// The confirmation wait was cancelled by the caller.
    Cancelled,
}

/// Crowdfunding client error types.
#[derive(Debug, Error)]
pub enum ContractError {
    /// No active wallet session (not connected, no accounts, or rejected).
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// Network error while talking to the ledger RPC endpoint.
    #[error("Network error: {0}")]
    Network(String),

    /// Transaction or call reverted by the contract.
    #[error("Execution reverted{}", .reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    ExecutionReverted {
        /// Revert reason, when the ledger returned one.
        reason: Option<String>,
    },

    /// Response could not be decoded.
    #[error("Decode failure: {0}")]
    Decode(String),

    /// Invalid caller input (amount, deadline, address).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Confirmation not observed in time.
    #[error("Timed out after {0:?} waiting for confirmation")]
    Timeout(Duration),

    /// Confirmation wait cancelled.
    #[error("Cancelled while waiting for confirmation")]
    Cancelled,
}

impl ContractError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::WalletUnavailable(_) => ErrorKind::WalletUnavailable,
            ContractError::Network(_) => ErrorKind::NetworkFailure,
            ContractError::ExecutionReverted { .. } => ErrorKind::ExecutionReverted,
            ContractError::Decode(_) => ErrorKind::DecodeFailure,
            ContractError::InvalidInput(_) => ErrorKind::InvalidInput,
            ContractError::Timeout(_) => ErrorKind::Timeout,
            ContractError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::NetworkFailure | ErrorKind::Timeout)
    }

    /// Revert without a reason string.
    pub fn reverted() -> Self {
        ContractError::ExecutionReverted { reason: None }
    }

    /// Revert with a reason string.
    pub fn reverted_with(reason: impl Into<String>) -> Self {
        ContractError::ExecutionReverted {
            reason: Some(reason.into()),
        }
    }
}

impl From<reqwest::Error> for ContractError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ContractError::Decode(e.to_string())
        } else {
            ContractError::Network(e.to_string())
        }
    }
}

impl From<alloy_sol_types::Error> for ContractError {
    fn from(e: alloy_sol_types::Error) -> Self {
        ContractError::Decode(e.to_string())
    }
}

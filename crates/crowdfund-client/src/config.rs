//! # Client Configuration
//!
//! Endpoint, contract address and confirmation policy.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::domain::ContractError;

/// Address of the deployed `CrowdFunding` contract.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xb8906448b7f618C032E57BD8Ea3a008717C9662F";

/// Default JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default confirmations before a transaction counts as done.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Crowdfunding client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Deployed contract address.
    pub contract_address: Address,

    /// Confirmations to wait for after submission.
    pub confirmations: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Default bound on the confirmation wait. `None` waits indefinitely.
    pub confirmation_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: default_contract_address(),
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval_ms: 2_000,
            request_timeout_secs: 30,
            confirmation_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Create a config for testing (fast polling, short timeouts).
    pub fn for_testing() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            contract_address: default_contract_address(),
            confirmations: 1,
            poll_interval_ms: 5,
            request_timeout_secs: 5,
            confirmation_timeout_secs: Some(5),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CROWDFUND_RPC_URL`: JSON-RPC endpoint (default: http://127.0.0.1:8545)
    /// - `CROWDFUND_CONTRACT_ADDRESS`: contract address (default: deployed instance)
    /// - `CROWDFUND_CONFIRMATIONS`: confirmations to wait for (default: 1)
    /// - `CROWDFUND_POLL_INTERVAL_MS`: receipt polling interval (default: 2000)
    /// - `CROWDFUND_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 30)
    /// - `CROWDFUND_CONFIRMATION_TIMEOUT_SECS`: confirmation bound (default: none)
    pub fn from_env() -> Result<Self, ContractError> {
        let defaults = Self::default();

        let contract_address = match env::var("CROWDFUND_CONTRACT_ADDRESS") {
            Ok(v) => parse_address(&v)?,
            Err(_) => defaults.contract_address,
        };

        Ok(Self {
            rpc_url: env::var("CROWDFUND_RPC_URL").unwrap_or(defaults.rpc_url),
            contract_address,
            confirmations: env_number("CROWDFUND_CONFIRMATIONS")?
                .unwrap_or(defaults.confirmations),
            poll_interval_ms: env_number("CROWDFUND_POLL_INTERVAL_MS")?
                .unwrap_or(defaults.poll_interval_ms),
            request_timeout_secs: env_number("CROWDFUND_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            confirmation_timeout_secs: env_number("CROWDFUND_CONFIRMATION_TIMEOUT_SECS")?
                .or(defaults.confirmation_timeout_secs),
        })
    }

    /// Receipt polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Default confirmation timeout.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }
}

fn default_contract_address() -> Address {
    Address::from_str(DEFAULT_CONTRACT_ADDRESS).unwrap_or_default()
}

/// Parse a hex address, checksummed or not.
pub fn parse_address(s: &str) -> Result<Address, ContractError> {
    Address::from_str(s.trim())
        .map_err(|e| ContractError::InvalidInput(format!("invalid address {:?}: {}", s, e)))
}

fn env_number(key: &str) -> Result<Option<u64>, ContractError> {
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ContractError::InvalidInput(format!("{} is not a number: {:?}", key, v))),
        Err(_) => Ok(None),
    }
}

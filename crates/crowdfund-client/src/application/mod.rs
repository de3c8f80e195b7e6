//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod confirm;
pub mod contract;
pub mod service;

pub use confirm::{wait_for_confirmation, ConfirmationPolicy};
pub use contract::CrowdFundingContract;
pub use service::ContractClientAdapter;

//! # Domain Layer
//!
//! Core types for the crowdfunding client: decoded campaign and donation
//! records, ether unit conversion, and the error taxonomy.

pub mod decode;
pub mod entities;
pub mod errors;
pub mod units;

pub use decode::{decode_campaigns, decode_deadline, parse_deadline_millis, zip_donations};
pub use entities::{CallOptions, Campaign, CampaignForm, ConfirmedTx, Donation};
pub use errors::{ContractError, ErrorKind};
pub use units::{format_ether, gas_with_headroom, parse_ether, ETHER_DECIMALS};

//! # Integration Scenarios
//!
//! Each file drives the public `CrowdfundingApi` the way a front-end does.

mod donation_flows;
mod failure_modes;
mod json_rpc_wire;

//! # CrowdFunding Interface Description
//!
//! Function and struct signatures of the deployed contract. The generated
//! call types carry the 4-byte selectors and the ABI codec used by
//! [`crate::application::CrowdFundingContract`].

#![allow(missing_docs)]

use alloy_sol_types::{sol, Revert, SolError};

sol! {
    #[derive(Debug)]
    #[sol(all_derives)]
    contract CrowdFunding {
        struct Campaign {
            address owner;
            string title;
            string description;
            uint256 target;
            uint256 deadline;
            uint256 amountCollected;
            string image;
            address[] donators;
            uint256[] donations;
        }

        function createCampaign(
            address owner,
            string memory title,
            string memory description,
            uint256 target,
            uint256 deadline,
            string memory image
        ) external returns (uint256);

        function donateToCampaign(uint256 id) external payable;

        function getDonators(uint256 id) external view returns (address[] memory, uint256[] memory);

        function getCampaigns() external view returns (Campaign[] memory);
    }
}

/// Extract the reason string from `Error(string)` revert data.
pub fn revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data, true).ok().map(|r| r.reason)
}

/// Encode a reason string as `Error(string)` revert data.
pub fn encode_revert(reason: &str) -> Vec<u8> {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
}

//! # Ledger Decoding
//!
//! Pure functions turning ledger-native values into domain records and
//! form input into ledger-native values.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::entities::{Campaign, Donation};
use super::errors::ContractError;
use super::units::format_ether;
use crate::abi::CrowdFunding;

/// Decode the contract's campaign list.
///
/// `p_id` is the zero-based position in ledger order.
pub fn decode_campaigns(raw: Vec<CrowdFunding::Campaign>) -> Result<Vec<Campaign>, ContractError> {
    raw.into_iter()
        .enumerate()
        .map(|(p_id, c)| {
            Ok(Campaign {
                owner: c.owner,
                title: c.title,
                description: c.description,
                target: format_ether(c.target),
                deadline: decode_deadline(c.deadline)?,
                amount_collected: format_ether(c.amountCollected),
                image: c.image,
                p_id,
            })
        })
        .collect()
}

/// Narrow a ledger deadline to `u64`.
pub fn decode_deadline(deadline: U256) -> Result<u64, ContractError> {
    u64::try_from(deadline)
        .map_err(|_| ContractError::Decode(format!("deadline out of range: {}", deadline)))
}

/// Zip the parallel donator/amount sequences returned by `getDonators`.
///
/// Both sequences must have the same length.
pub fn zip_donations(
    donators: Vec<Address>,
    amounts: Vec<U256>,
) -> Result<Vec<Donation>, ContractError> {
    if donators.len() != amounts.len() {
        return Err(ContractError::Decode(format!(
            "donator/amount length mismatch: {} != {}",
            donators.len(),
            amounts.len()
        )));
    }

    Ok(donators
        .into_iter()
        .zip(amounts)
        .map(|(donator, amount)| Donation {
            donator,
            donation: format_ether(amount),
        })
        .collect())
}

/// Convert a form deadline to epoch milliseconds.
///
/// Accepts a bare integer (already epoch ms), `YYYY-MM-DD` (UTC midnight),
/// `YYYY-MM-DDTHH:MM[:SS]` (UTC) and RFC 3339.
pub fn parse_deadline_millis(input: &str) -> Result<u64, ContractError> {
    let s = input.trim();
    let invalid = || ContractError::InvalidInput(format!("invalid deadline: {:?}", input));

    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<u64>().map_err(|_| invalid());
    }

    let millis = if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)
            .ok_or_else(invalid)?
            .and_utc()
            .timestamp_millis()
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.timestamp_millis()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
    {
        naive.and_utc().timestamp_millis()
    } else {
        return Err(invalid());
    };

    u64::try_from(millis).map_err(|_| invalid())
}

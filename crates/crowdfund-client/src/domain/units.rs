//! # Ether Units
//!
//! Conversion between human decimal strings and the ledger's base units
//! (fixed-point integers scaled by 10^18). All arithmetic is done on
//! `U256`, so `"1.5"` maps to exactly `1_500_000_000_000_000_000`.

use alloy_primitives::{utils, U256};

use super::errors::ContractError;

/// Number of decimals of the native currency.
pub const ETHER_DECIMALS: usize = 18;

/// 10^18 as a `U256`.
fn wei_per_ether() -> U256 {
    U256::from(1_000_000_000_000_000_000u64)
}

/// Parse a decimal ether amount into base units.
///
/// Accepts `"10"`, `"1.5"`, `".5"`, `"2."` and surrounding whitespace.
/// Rejects signs, exponents, more than 18 fractional digits and values
/// that overflow 256 bits. Well-formed input is scaled by
/// `alloy_primitives::utils::parse_ether`.
pub fn parse_ether(amount: &str) -> Result<U256, ContractError> {
    let trimmed = amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) {
        return Err(ContractError::InvalidInput(format!(
            "invalid ether amount: {:?}",
            amount
        )));
    }
    if fraction.len() > ETHER_DECIMALS {
        return Err(ContractError::InvalidInput(format!(
            "fractional component exceeds {} decimals: {:?}",
            ETHER_DECIMALS, amount
        )));
    }

    utils::parse_ether(trimmed).map_err(|e| {
        ContractError::InvalidInput(format!("ether amount overflows: {:?} ({})", amount, e))
    })
}

/// Render base units as a decimal ether string.
///
/// Trailing fractional zeros are stripped but at least one fractional
/// digit is kept: `10^19` renders as `"10.0"`, zero as `"0.0"`.
pub fn format_ether(wei: U256) -> String {
    let (whole, fraction) = wei.div_rem(wei_per_ether());

    let digits = fraction.to_string();
    let mut fraction_str = "0".repeat(ETHER_DECIMALS - digits.len());
    fraction_str.push_str(&digits);

    let trimmed = fraction_str.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Gas limit for a transaction whose estimate is `estimate`, with 20%
/// headroom.
pub fn gas_with_headroom(estimate: U256) -> U256 {
    estimate + estimate / U256::from(5u64)
}

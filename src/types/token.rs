//! Token-related types.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Information about a token as reported to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Checksummed token contract address.
    pub address: String,
    /// Canonical registry symbol (e.g., "WPOL", "USDC").
    pub symbol: String,
    /// Number of decimals.
    pub decimals: u8,
}

impl TokenInfo {
    /// Create a new TokenInfo for an ERC20 token.
    pub fn erc20(address: Address, symbol: String, decimals: u8) -> Self {
        Self { address: address.to_checksum(None), symbol, decimals }
    }
}

/// Format a U256 value with decimals to a human-readable string.
///
/// Trailing fractional zeros are dropped, so whole amounts print without a
/// decimal point.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return digits;
    }

    // Left-pad so there is always at least one integer digit.
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = padded.split_at(padded.len() - decimals);

    match fraction.trim_end_matches('0') {
        "" => integer.to_string(),
        fraction => format!("{integer}.{fraction}"),
    }
}

/// Parse a base-10 amount in minor units (no decimal point, no sign).
pub fn parse_minor_units(amount: &str) -> Result<U256, String> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err("Amount cannot be empty".to_string());
    }

    if amount.starts_with('-') {
        return Err("Amount cannot be negative".to_string());
    }

    if !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Amount must be an integer in minor units: {}", amount));
    }

    U256::from_str_radix(amount, 10).map_err(|e| format!("Invalid amount: {}", e))
}

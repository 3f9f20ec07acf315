//! Token Registry service.
//!
//! Maps caller-supplied symbols to canonical Polygon token addresses. The
//! table is fixed at startup and never mutated afterwards.

use std::collections::HashMap;

use alloy::primitives::Address;
use tracing::info;

use crate::error::{AppError, Result};
use crate::types::TokenInfo;
use crate::ethereum::constants::{
    BET_ADDRESS, DAI_ADDRESS, FRAX_ADDRESS, GMT_ADDRESS, LINK_ADDRESS, SAND_ADDRESS,
    TBTC_ADDRESS, USDC_ADDRESS, USDT_ADDRESS, WPOL_ADDRESS, WSTETH_ADDRESS,
};

/// Canonical symbol of the wrapped native token.
pub const WRAPPED_NATIVE_SYMBOL: &str = "WPOL";

/// Symbols that collapse onto [`WRAPPED_NATIVE_SYMBOL`].
pub const WRAPPED_NATIVE_ALIASES: [&str; 4] = ["POL", "MATIC", "WMATIC", "WPOL"];

// ============================================================================
// Token Entry
// ============================================================================

/// A registered token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEntry {
    /// Token contract address.
    pub address: Address,
    /// Canonical uppercase symbol.
    pub symbol: String,
    /// Number of decimals.
    pub decimals: u8,
    /// Whether one unit is treated as one US dollar for liquidity estimates.
    pub usd_stable: bool,
}

impl TokenEntry {
    pub fn new(address: Address, symbol: &str, decimals: u8, usd_stable: bool) -> Self {
        Self {
            address,
            symbol: symbol.to_uppercase(),
            decimals,
            usd_stable,
        }
    }

    /// Caller-facing view of this entry.
    pub fn info(&self) -> TokenInfo {
        TokenInfo::erc20(self.address, self.symbol.clone(), self.decimals)
    }
}

// ============================================================================
// Token Registry
// ============================================================================

/// Immutable symbol/address table.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    /// Tokens indexed by canonical symbol.
    by_symbol: HashMap<String, TokenEntry>,
    /// Tokens indexed by address.
    by_address: HashMap<Address, TokenEntry>,
    /// The routing hop token.
    wrapped_native: TokenEntry,
}

impl TokenRegistry {
    /// Registry holding the Polygon PoS token table.
    pub fn polygon() -> Self {
        let entries = vec![
            TokenEntry::new(USDT_ADDRESS, "USDT", 6, true),
            TokenEntry::new(USDC_ADDRESS, "USDC", 6, true),
            TokenEntry::new(DAI_ADDRESS, "DAI", 18, false),
            TokenEntry::new(FRAX_ADDRESS, "FRAX", 18, false),
            TokenEntry::new(LINK_ADDRESS, "LINK", 18, false),
            TokenEntry::new(WSTETH_ADDRESS, "wstETH", 18, false),
            TokenEntry::new(TBTC_ADDRESS, "tBTC", 18, false),
            TokenEntry::new(SAND_ADDRESS, "SAND", 18, false),
            TokenEntry::new(GMT_ADDRESS, "GMT", 8, false),
            TokenEntry::new(BET_ADDRESS, "BET", 18, false),
            TokenEntry::new(WPOL_ADDRESS, WRAPPED_NATIVE_SYMBOL, 18, false),
        ];

        // The built-in table is unique by construction.
        match Self::from_entries(entries) {
            Ok(registry) => registry,
            Err(e) => unreachable!("built-in token table is invalid: {e}"),
        }
    }

    /// Build a registry from explicit entries.
    ///
    /// # Errors
    /// Returns `AppError::Config` if two entries share a symbol or address
    /// after normalization, or if no WPOL entry is present.
    pub fn from_entries(entries: Vec<TokenEntry>) -> Result<Self> {
        let mut by_symbol = HashMap::new();
        let mut by_address = HashMap::new();

        for mut entry in entries {
            entry.symbol = Self::normalize(&entry.symbol);

            if by_symbol.contains_key(&entry.symbol) {
                return Err(AppError::Config(format!("Duplicate token symbol: {}", entry.symbol)));
            }
            if by_address.contains_key(&entry.address) {
                return Err(AppError::Config(format!(
                    "Duplicate token address: {}",
                    entry.address
                )));
            }

            by_address.insert(entry.address, entry.clone());
            by_symbol.insert(entry.symbol.clone(), entry);
        }

        let wrapped_native = by_symbol.get(WRAPPED_NATIVE_SYMBOL).cloned().ok_or_else(|| {
            AppError::Config(format!("Token table has no {WRAPPED_NATIVE_SYMBOL} entry"))
        })?;

        info!("Token registry loaded with {} tokens", by_symbol.len());

        Ok(Self { by_symbol, by_address, wrapped_native })
    }

    /// Uppercase a symbol and collapse wrapped-native aliases onto `WPOL`.
    pub fn normalize(symbol: &str) -> String {
        let upper = symbol.trim().to_uppercase();
        if WRAPPED_NATIVE_ALIASES.contains(&upper.as_str()) {
            WRAPPED_NATIVE_SYMBOL.to_string()
        } else {
            upper
        }
    }

    /// Resolve a symbol (aliases and case allowed) to its entry.
    pub fn lookup(&self, symbol: &str) -> Result<&TokenEntry> {
        let key = Self::normalize(symbol);
        self.by_symbol.get(&key).ok_or(AppError::UnsupportedToken(key))
    }

    /// Look up a token by address.
    pub fn lookup_address(&self, address: Address) -> Option<&TokenEntry> {
        self.by_address.get(&address)
    }

    /// The wrapped native token used as routing hop.
    pub fn wrapped_native(&self) -> &TokenEntry {
        &self.wrapped_native
    }

    /// Entries treated as USD-pegged for liquidity estimates.
    pub fn stablecoins(&self) -> impl Iterator<Item = &TokenEntry> {
        self.by_symbol.values().filter(|t| t.usd_stable)
    }

    /// All registered tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &TokenEntry> {
        self.by_symbol.values()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::polygon()
    }
}

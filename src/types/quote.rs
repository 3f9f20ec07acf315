//! Quote-related types.

use std::fmt;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::token::{format_units, TokenInfo};

/// Source tag reported on every quote produced by the on-chain resolver.
pub const QUOTE_SOURCE: &str = "Web3";

/// Parameters for a quote request.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    /// Source token symbol (aliases allowed, case-insensitive).
    pub src: String,
    /// Destination token symbol (aliases allowed, case-insensitive).
    pub dst: String,
    /// Amount to sell in the source token's smallest unit.
    pub amount_in: U256,
}

impl QuoteRequest {
    pub fn new(src: impl Into<String>, dst: impl Into<String>, amount_in: U256) -> Self {
        Self { src: src.into(), dst: dst.into(), amount_in }
    }
}

/// Result of a successful quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    /// Output amount in the destination token's smallest unit, base 10.
    pub buy_amount: String,
    /// Always empty for the on-chain resolver.
    pub protocols: Vec<String>,
    /// Always [`QUOTE_SOURCE`].
    pub source: String,
    /// Canonical symbols of the path the router quoted.
    #[serde(skip)]
    pub path: Vec<String>,
}

impl QuoteResult {
    /// Build a result from the router's final output amount.
    pub fn from_router(amount_out: U256, path: Vec<String>) -> Self {
        Self {
            buy_amount: amount_out.to_string(),
            protocols: Vec::new(),
            source: QUOTE_SOURCE.to_string(),
            path,
        }
    }
}

/// Which leg of the routing policy a pair was checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteLeg {
    /// The (src, dst) pair.
    Direct,
    /// The (src, WPOL) pair on the fallback route.
    ViaHop,
}

impl fmt::Display for RouteLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteLeg::Direct => f.write_str("direct"),
            RouteLeg::ViaHop => f.write_str("via-hop"),
        }
    }
}

/// Reserves and token ordering of an existing pair contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSnapshot {
    /// Pair contract address.
    pub pair: Address,
    /// Lower-sorted token of the pair, as reported by the contract.
    pub token0: Address,
    /// Higher-sorted token of the pair, as reported by the contract.
    pub token1: Address,
    /// Reserve of token0 (uint112).
    pub reserve0: u128,
    /// Reserve of token1 (uint112).
    pub reserve1: u128,
}

/// Outcome of a pair probe.
#[derive(Debug, Clone, PartialEq)]
pub enum PairLiquidity {
    /// The factory returned the zero address.
    NoPair,
    /// The pair exists.
    Found {
        snapshot: PairSnapshot,
        /// USD when a stablecoin side is present, raw units otherwise.
        estimate: f64,
    },
}

impl PairLiquidity {
    /// Liquidity estimate; exactly zero when the pair does not exist.
    pub fn estimate(&self) -> f64 {
        match self {
            PairLiquidity::NoPair => 0.0,
            PairLiquidity::Found { estimate, .. } => *estimate,
        }
    }

    pub fn is_no_pair(&self) -> bool {
        matches!(self, PairLiquidity::NoPair)
    }
}

/// One side of a pair as shown by the `pair_liquidity` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSide {
    /// Token address (checksummed).
    pub address: String,
    /// Raw reserve in minor units.
    pub reserve: String,
    /// Registry metadata, when the token is registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfo>,
    /// Reserve scaled by the registry's decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserve_formatted: Option<String>,
}

impl PairSide {
    fn new(address: Address, reserve: u128, token: Option<TokenInfo>) -> Self {
        let reserve_formatted =
            token.as_ref().map(|t| format_units(U256::from(reserve), t.decimals));
        Self { address: address.to_checksum(None), reserve: reserve.to_string(), token, reserve_formatted }
    }
}

/// Pair liquidity report returned by the `pair_liquidity` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairLiquidityInfo {
    /// Pair contract address, or None when no pair exists.
    pub pair: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token0: Option<PairSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token1: Option<PairSide>,
    /// Liquidity estimate.
    pub estimate: f64,
    /// Configured floor the estimate is compared against.
    pub floor: f64,
    /// Whether the estimate meets the floor.
    pub meets_floor: bool,
}

impl PairLiquidityInfo {
    /// Build the report. `describe` supplies registry metadata for known tokens.
    pub fn new<F>(liquidity: &PairLiquidity, floor: f64, describe: F) -> Self
    where
        F: Fn(Address) -> Option<TokenInfo>,
    {
        let estimate = liquidity.estimate();
        match liquidity {
            PairLiquidity::NoPair => {
                Self { pair: None, token0: None, token1: None, estimate, floor, meets_floor: false }
            }
            PairLiquidity::Found { snapshot, .. } => Self {
                pair: Some(snapshot.pair.to_checksum(None)),
                token0: Some(PairSide::new(
                    snapshot.token0,
                    snapshot.reserve0,
                    describe(snapshot.token0),
                )),
                token1: Some(PairSide::new(
                    snapshot.token1,
                    snapshot.reserve1,
                    describe(snapshot.token1),
                )),
                estimate,
                floor,
                meets_floor: estimate >= floor,
            },
        }
    }
}

/// Result of a connectivity probe against the RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStatus {
    /// Whether the endpoint answered `eth_blockNumber`.
    pub connected: bool,
    /// Chain ID reported by the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Latest block number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Length of the latest header's extraData field in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data_len: Option<usize>,
}

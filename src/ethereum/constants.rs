//! Polygon PoS network constants.
//!
//! Contains the chain ID, QuickSwap V2 deployment addresses and the token
//! addresses backing the registry.

use alloy::primitives::{address, Address};

// ============================================================================
// Chain IDs
// ============================================================================

/// Polygon PoS mainnet chain ID.
pub const POLYGON_CHAIN_ID: u64 = 137;

// ============================================================================
// QuickSwap V2 Addresses (Polygon PoS)
// ============================================================================

/// QuickSwap V2 router.
pub const QUICKSWAP_V2_ROUTER: Address = address!("a5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff");

/// QuickSwap V2 factory.
pub const QUICKSWAP_V2_FACTORY: Address = address!("5757371414417b8c6caad45baef941abc7d3ab32");

// ============================================================================
// Token Addresses (Polygon PoS)
// ============================================================================

/// Wrapped POL (formerly WMATIC). Canonical routing hop.
pub const WPOL_ADDRESS: Address = address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270");

/// Tether USD (PoS bridged).
pub const USDT_ADDRESS: Address = address!("c2132D05D31c914a87C6611C10748AEb04B58e8F");

/// USD Coin (PoS bridged, USDC.e).
pub const USDC_ADDRESS: Address = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

/// Dai Stablecoin.
pub const DAI_ADDRESS: Address = address!("8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063");

/// Frax.
pub const FRAX_ADDRESS: Address = address!("45c32fA6DF82ead1e2EF74d17b76547EDdFaFF89");

/// Chainlink token.
pub const LINK_ADDRESS: Address = address!("53E0bca35eC356BD5ddDFebbD1Fc0fD03FaBad39");

/// Lido wrapped staked ETH.
pub const WSTETH_ADDRESS: Address = address!("03b54A6e9a984069379fae1a4fC4dBAE93B3bCCD");

/// Threshold tBTC.
pub const TBTC_ADDRESS: Address = address!("236aa50979D5f3De3Bd1Eeb40E81137F22ab794b");

/// The Sandbox.
pub const SAND_ADDRESS: Address = address!("BbbA073C31bF03b8ACf7c28EF0738DeCF3695683");

/// STEPN green metaverse token.
pub const GMT_ADDRESS: Address = address!("714DB550b574b3E927af3D93E26127D15721D4C2");

/// BET token.
pub const BET_ADDRESS: Address = address!("47Da42124A67EF2d2fcea8F53C937b83E9092fD6");

//! Pair probe service.
//!
//! Locates a QuickSwap V2 pair through the factory, reads its reserves and
//! token ordering, and derives a liquidity estimate.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::{
    error::Result,
    ethereum::{
        call_contract,
        contracts::uniswap_v2::{IUniswapV2Factory, IUniswapV2Pair},
        ChainClient,
    },
    services::TokenRegistry,
    types::{PairLiquidity, PairSnapshot},
};

/// Service for probing pair liquidity.
#[derive(Clone)]
pub struct PairProbe {
    client: Arc<dyn ChainClient>,
    factory: Address,
    /// USD-pegged tokens and their decimals.
    stablecoins: HashMap<Address, u8>,
    /// Nonzero factory results keyed by sorted token pair. Reserves are never cached.
    pair_cache: Arc<RwLock<HashMap<(Address, Address), Address>>>,
}

impl PairProbe {
    /// Create a new pair probe.
    pub fn new(client: Arc<dyn ChainClient>, factory: Address, registry: &TokenRegistry) -> Self {
        let stablecoins = registry.stablecoins().map(|t| (t.address, t.decimals)).collect();
        Self { client, factory, stablecoins, pair_cache: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Probe the pair for `token_a` and `token_b`.
    ///
    /// Returns `PairLiquidity::NoPair` (not an error) when the factory reports
    /// the zero address. RPC failures propagate.
    pub async fn probe(&self, token_a: Address, token_b: Address) -> Result<PairLiquidity> {
        let Some(pair) = self.find_pair(token_a, token_b).await? else {
            tracing::debug!(token_a = %token_a, token_b = %token_b, "Factory reports no pair");
            return Ok(PairLiquidity::NoPair);
        };

        // Three reads, not atomic across blocks. The reserves themselves come
        // from a single getReserves return.
        let reserves =
            call_contract(self.client.as_ref(), pair, &IUniswapV2Pair::getReservesCall {}).await?;
        let token0 = call_contract(self.client.as_ref(), pair, &IUniswapV2Pair::token0Call {}).await?;
        let token1 = call_contract(self.client.as_ref(), pair, &IUniswapV2Pair::token1Call {}).await?;

        let snapshot = PairSnapshot {
            pair,
            token0,
            token1,
            reserve0: reserves.reserve0.to::<u128>(),
            reserve1: reserves.reserve1.to::<u128>(),
        };
        let estimate = self.estimate(&snapshot);

        tracing::debug!(
            pair = %pair,
            reserve0 = snapshot.reserve0,
            reserve1 = snapshot.reserve1,
            estimate = estimate,
            "Pair probed"
        );

        Ok(PairLiquidity::Found { snapshot, estimate })
    }

    /// Liquidity estimate for a snapshot.
    ///
    /// USD value of the stablecoin side when token0 or token1 is USD-pegged
    /// (token0 wins when both are). Otherwise `min(reserve0, reserve1)` in raw
    /// units, which is not USD but is monotone in pool depth.
    pub fn estimate(&self, snapshot: &PairSnapshot) -> f64 {
        if let Some(decimals) = self.stablecoins.get(&snapshot.token0) {
            return scale(snapshot.reserve0, *decimals);
        }
        if let Some(decimals) = self.stablecoins.get(&snapshot.token1) {
            return scale(snapshot.reserve1, *decimals);
        }
        snapshot.reserve0.min(snapshot.reserve1) as f64
    }

    async fn find_pair(&self, token_a: Address, token_b: Address) -> Result<Option<Address>> {
        let key = if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };

        if let Some(pair) = self.pair_cache.read().await.get(&key) {
            return Ok(Some(*pair));
        }

        let pair = call_contract(
            self.client.as_ref(),
            self.factory,
            &IUniswapV2Factory::getPairCall { tokenA: token_a, tokenB: token_b },
        )
        .await?;

        if pair == Address::ZERO {
            // A pair may still be created later, so misses are not cached.
            return Ok(None);
        }

        self.pair_cache.write().await.insert(key, pair);
        Ok(Some(pair))
    }
}

fn scale(raw: u128, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

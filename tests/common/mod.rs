//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use polygon_quote_mcp::ethereum::contracts::uniswap_v2::{
    IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02,
};
use polygon_quote_mcp::ethereum::{BlockSummary, ChainClient};
use polygon_quote_mcp::{
    AppError, Config, QuoteServer, ResolverSettings, Result, RouteResolver, TokenRegistry,
    POLYGON_CHAIN_ID, QUICKSWAP_V2_FACTORY, QUICKSWAP_V2_ROUTER,
};

/// A contract call observed by [`MockChainClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetPair(Address, Address),
    GetReserves(Address),
    Token0(Address),
    Token1(Address),
    GetAmountsOut(Vec<Address>),
}

/// How the router answers for a given path.
#[derive(Debug, Clone)]
pub enum RouterReply {
    Amounts(Vec<U256>),
    Revert(String),
    Rpc(String),
}

#[derive(Debug, Clone, Copy)]
struct MockPool {
    token0: Address,
    token1: Address,
    reserve0: u128,
    reserve1: u128,
}

/// Chain client scripted at the `eth_call` boundary.
///
/// Pairs not registered with [`MockChainClient::with_pair`] resolve to the
/// zero address, like the real factory.
#[derive(Default)]
pub struct MockChainClient {
    pairs: HashMap<(Address, Address), Address>,
    pools: HashMap<Address, MockPool>,
    routes: HashMap<Vec<Address>, RouterReply>,
    failing_pairs: HashSet<(Address, Address)>,
    delay: Option<Duration>,
    offline: bool,
    calls: Mutex<Vec<MockCall>>,
    next_pair: u8,
}

fn sorted(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair holding `reserve_a` of `token_a` and `reserve_b` of
    /// `token_b`. token0/token1 follow the factory's address ordering.
    pub fn with_pair(mut self, token_a: Address, token_b: Address, reserve_a: u128, reserve_b: u128) -> Self {
        self.next_pair += 1;
        let pair = Address::with_last_byte(self.next_pair);

        let pool = if token_a < token_b {
            MockPool { token0: token_a, token1: token_b, reserve0: reserve_a, reserve1: reserve_b }
        } else {
            MockPool { token0: token_b, token1: token_a, reserve0: reserve_b, reserve1: reserve_a }
        };

        self.pairs.insert(sorted(token_a, token_b), pair);
        self.pools.insert(pair, pool);
        self
    }

    /// Router returns `amounts` for `path`.
    pub fn with_route(mut self, path: &[Address], amounts: &[u128]) -> Self {
        let amounts = amounts.iter().map(|a| U256::from(*a)).collect();
        self.routes.insert(path.to_vec(), RouterReply::Amounts(amounts));
        self
    }

    /// Router reverts for `path`.
    pub fn with_route_revert(mut self, path: &[Address], reason: &str) -> Self {
        self.routes.insert(path.to_vec(), RouterReply::Revert(reason.to_string()));
        self
    }

    /// Router call for `path` fails at the transport level.
    pub fn with_route_rpc_error(mut self, path: &[Address], message: &str) -> Self {
        self.routes.insert(path.to_vec(), RouterReply::Rpc(message.to_string()));
        self
    }

    /// Factory lookup for the pair fails at the transport level.
    pub fn with_failing_pair(mut self, token_a: Address, token_b: Address) -> Self {
        self.failing_pairs.insert(sorted(token_a, token_b));
        self
    }

    /// Every `eth_call` sleeps for `delay` first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call fails with an RPC error.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn pair_address(&self, token_a: Address, token_b: Address) -> Option<Address> {
        self.pairs.get(&sorted(token_a, token_b)).copied()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_pair_calls(&self) -> Vec<(Address, Address)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::GetPair(a, b) => Some((a, b)),
                _ => None,
            })
            .collect()
    }

    pub fn router_paths(&self) -> Vec<Vec<Address>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::GetAmountsOut(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn pool(&self, pair: Address) -> Result<MockPool> {
        self.pools
            .get(&pair)
            .copied()
            .ok_or_else(|| AppError::ContractRevert(format!("no contract at {pair}")))
    }

    fn dispatch(&self, to: Address, data: &[u8]) -> Result<Bytes> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| AppError::ContractRevert("empty calldata".into()))?;

        let encoded = match selector {
            s if s == IUniswapV2Factory::getPairCall::SELECTOR => {
                assert_eq!(to, QUICKSWAP_V2_FACTORY, "getPair sent to non-factory address");
                let call = IUniswapV2Factory::getPairCall::abi_decode(data).unwrap();
                self.record(MockCall::GetPair(call.tokenA, call.tokenB));

                let key = sorted(call.tokenA, call.tokenB);
                if self.failing_pairs.contains(&key) {
                    return Err(AppError::Rpc("factory lookup failed".into()));
                }
                let pair = self.pairs.get(&key).copied().unwrap_or(Address::ZERO);
                (pair,).abi_encode_params()
            }
            s if s == IUniswapV2Pair::getReservesCall::SELECTOR => {
                self.record(MockCall::GetReserves(to));
                let pool = self.pool(to)?;
                (U256::from(pool.reserve0), U256::from(pool.reserve1), U256::from(1_700_000_000u64))
                    .abi_encode_params()
            }
            s if s == IUniswapV2Pair::token0Call::SELECTOR => {
                self.record(MockCall::Token0(to));
                (self.pool(to)?.token0,).abi_encode_params()
            }
            s if s == IUniswapV2Pair::token1Call::SELECTOR => {
                self.record(MockCall::Token1(to));
                (self.pool(to)?.token1,).abi_encode_params()
            }
            s if s == IUniswapV2Router02::getAmountsOutCall::SELECTOR => {
                assert_eq!(to, QUICKSWAP_V2_ROUTER, "getAmountsOut sent to non-router address");
                let call = IUniswapV2Router02::getAmountsOutCall::abi_decode(data).unwrap();
                self.record(MockCall::GetAmountsOut(call.path.clone()));

                match self.routes.get(&call.path) {
                    Some(RouterReply::Amounts(amounts)) => (amounts.clone(),).abi_encode_params(),
                    Some(RouterReply::Revert(reason)) => {
                        return Err(AppError::ContractRevert(reason.clone()))
                    }
                    Some(RouterReply::Rpc(message)) => return Err(AppError::Rpc(message.clone())),
                    None => {
                        return Err(AppError::ContractRevert(
                            "UniswapV2Library: INSUFFICIENT_LIQUIDITY".into(),
                        ))
                    }
                }
            }
            other => {
                return Err(AppError::ContractRevert(format!(
                    "unexpected selector 0x{}",
                    alloy::primitives::hex::encode(other)
                )))
            }
        };

        Ok(Bytes::from(encoded))
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline {
            return Err(AppError::Rpc("connection refused".into()));
        }
        self.dispatch(to, &data)
    }

    async fn block_number(&self) -> Result<u64> {
        if self.offline {
            return Err(AppError::Rpc("connection refused".into()));
        }
        Ok(55_000_000)
    }

    async fn chain_id(&self) -> Result<u64> {
        if self.offline {
            return Err(AppError::Rpc("connection refused".into()));
        }
        Ok(POLYGON_CHAIN_ID)
    }

    async fn latest_block(&self) -> Result<BlockSummary> {
        if self.offline {
            return Err(AppError::Rpc("connection refused".into()));
        }
        Ok(BlockSummary { number: 55_000_000, timestamp: 1_700_000_000, extra_data_len: 97 })
    }
}

/// Settings with the given floor and a short request deadline.
pub fn settings(min_liq_usd: f64) -> ResolverSettings {
    ResolverSettings { min_liq_usd, quote_timeout: Duration::from_secs(5) }
}

/// Resolver over `mock` using the Polygon token table.
pub fn resolver(mock: Arc<MockChainClient>, min_liq_usd: f64) -> RouteResolver {
    RouteResolver::new(
        mock,
        Arc::new(TokenRegistry::polygon()),
        QUICKSWAP_V2_ROUTER,
        QUICKSWAP_V2_FACTORY,
        settings(min_liq_usd),
    )
}

/// MCP server over `mock`.
pub fn mock_server(mock: Arc<MockChainClient>, min_liq_usd: f64) -> QuoteServer {
    QuoteServer::with_client(mock, settings(min_liq_usd))
}

/// Helper to create a server against a live endpoint from environment variables.
pub fn create_live_server() -> Option<QuoteServer> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().ok()?;
    QuoteServer::new(config).ok()
}

/// Skip test if no live endpoint is configured.
#[macro_export]
macro_rules! skip_if_no_live_server {
    () => {
        match common::create_live_server() {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: ALCHEMY_POLYGON_RPC not set");
                return;
            }
        }
    };
}

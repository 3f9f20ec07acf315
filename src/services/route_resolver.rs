//! Route resolver service.
//!
//! Produces router quotes for a token pair: the direct path first, then a
//! single fallback through WPOL. Both legs are gated by the liquidity floor.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{Config, DEFAULT_MIN_LIQ_USD, DEFAULT_QUOTE_TIMEOUT},
    error::{AppError, Result},
    ethereum::{call_contract, contracts::uniswap_v2::IUniswapV2Router02, ChainClient},
    services::{token_registry::TokenEntry, PairProbe, TokenRegistry},
    types::{format_units, PairLiquidity, QuoteRequest, QuoteResult, RouteLeg},
};

/// Tunables for the resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    /// Minimum liquidity estimate for every traversed pair.
    pub min_liq_usd: f64,
    /// Deadline for a whole request.
    pub quote_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self { min_liq_usd: DEFAULT_MIN_LIQ_USD, quote_timeout: DEFAULT_QUOTE_TIMEOUT }
    }
}

impl From<&Config> for ResolverSettings {
    fn from(config: &Config) -> Self {
        Self { min_liq_usd: config.min_liq_usd, quote_timeout: config.quote_timeout }
    }
}

/// Why the direct attempt did not produce a quote.
enum DirectOutcome {
    Quoted(U256),
    /// Worth retrying through WPOL.
    Fallback(AppError),
}

/// Service resolving quotes against the router.
#[derive(Clone)]
pub struct RouteResolver {
    client: Arc<dyn ChainClient>,
    registry: Arc<TokenRegistry>,
    probe: PairProbe,
    router: Address,
    settings: ResolverSettings,
}

impl RouteResolver {
    /// Create a new route resolver.
    pub fn new(
        client: Arc<dyn ChainClient>,
        registry: Arc<TokenRegistry>,
        router: Address,
        factory: Address,
        settings: ResolverSettings,
    ) -> Self {
        let probe = PairProbe::new(client.clone(), factory, &registry);
        Self { client, registry, probe, router, settings }
    }

    /// Configured resolver settings.
    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// Pair probe sharing this resolver's client and pair cache.
    pub fn probe(&self) -> &PairProbe {
        &self.probe
    }

    /// Token registry backing symbol resolution.
    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Quote `request`, bounded by the request deadline.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResult> {
        self.quote_with_cancel(request, &CancellationToken::new()).await
    }

    /// Quote `request`, aborting with `AppError::Cancelled` once `cancel` fires.
    ///
    /// Cancellation drops the in-flight RPC; no partial result is returned.
    pub async fn quote_with_cancel(
        &self,
        request: &QuoteRequest,
        cancel: &CancellationToken,
    ) -> Result<QuoteResult> {
        tracing::info!(
            src = %request.src,
            dst = %request.dst,
            amount_in = %request.amount_in,
            "Resolving quote"
        );

        let deadline = self.settings.quote_timeout;
        // Cancellation wins over a resolve that is ready on its first poll.
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            outcome = tokio::time::timeout(deadline, self.resolve(request)) => match outcome {
                Ok(result) => result,
                Err(_) => Err(AppError::Rpc(format!("quote timed out after {:?}", deadline))),
            },
        };

        match &result {
            Ok(quote) => tracing::info!(
                buy_amount = %quote.buy_amount,
                path = ?quote.path,
                "Quote resolved"
            ),
            Err(e) => tracing::warn!(src = %request.src, dst = %request.dst, error = %e, "Quote failed"),
        }

        result
    }

    async fn resolve(&self, request: &QuoteRequest) -> Result<QuoteResult> {
        // NORMALIZE
        let src = self.registry.lookup(&request.src)?;
        let dst = self.registry.lookup(&request.dst)?;
        if src.address == dst.address {
            return Err(AppError::UnsupportedToken(format!(
                "{} (source and destination are the same token)",
                src.symbol
            )));
        }

        let wpol = self.registry.wrapped_native();
        let touches_wpol = src.address == wpol.address || dst.address == wpol.address;

        // DIRECT_LIQ_CHECK + DIRECT_QUOTE
        let direct_err = match self.try_direct(src, dst, request.amount_in).await? {
            DirectOutcome::Quoted(amount_out) => {
                tracing::debug!(
                    amount_in = %format_units(request.amount_in, src.decimals),
                    amount_out = %format_units(amount_out, dst.decimals),
                    "{} -> {} quoted direct",
                    src.symbol,
                    dst.symbol
                );
                return Ok(QuoteResult::from_router(
                    amount_out,
                    vec![src.symbol.clone(), dst.symbol.clone()],
                ));
            }
            DirectOutcome::Fallback(err) => err,
        };

        if touches_wpol {
            // There is no hop to try.
            return Err(match direct_err {
                err @ AppError::LowLiquidity { .. } => err,
                err => AppError::no_route(&src.symbol, &dst.symbol, err),
            });
        }

        tracing::warn!(
            src = %src.symbol,
            dst = %dst.symbol,
            reason = %direct_err,
            "Direct route unavailable, retrying via {}",
            wpol.symbol
        );

        // HOP_LIQ_CHECK + HOP_QUOTE
        let amount_out = self.try_hop(src, wpol, dst, request.amount_in).await?;
        tracing::debug!(
            amount_in = %format_units(request.amount_in, src.decimals),
            amount_out = %format_units(amount_out, dst.decimals),
            "{} -> {} -> {} quoted via hop",
            src.symbol,
            wpol.symbol,
            dst.symbol
        );
        Ok(QuoteResult::from_router(
            amount_out,
            vec![src.symbol.clone(), wpol.symbol.clone(), dst.symbol.clone()],
        ))
    }

    /// Direct attempt. Probe RPC failures are terminal; everything the hop
    /// could route around becomes `Fallback`.
    async fn try_direct(
        &self,
        src: &TokenEntry,
        dst: &TokenEntry,
        amount_in: U256,
    ) -> Result<DirectOutcome> {
        match self.probe.probe(src.address, dst.address).await? {
            PairLiquidity::NoPair => {
                return Ok(DirectOutcome::Fallback(AppError::NoPair {
                    token_a: src.symbol.clone(),
                    token_b: dst.symbol.clone(),
                }));
            }
            PairLiquidity::Found { estimate, .. } if estimate < self.settings.min_liq_usd => {
                return Ok(DirectOutcome::Fallback(AppError::LowLiquidity {
                    leg: RouteLeg::Direct,
                    src: src.symbol.clone(),
                    dst: dst.symbol.clone(),
                    estimate,
                    floor: self.settings.min_liq_usd,
                }));
            }
            PairLiquidity::Found { .. } => {}
        }

        match self.amounts_out(amount_in, vec![src.address, dst.address]).await {
            Ok(amount_out) => Ok(DirectOutcome::Quoted(amount_out)),
            Err(err) => Ok(DirectOutcome::Fallback(err)),
        }
    }

    /// Hop attempt through WPOL. Only the (src, WPOL) pair is probed; the
    /// (WPOL, dst) leg is left to the router.
    async fn try_hop(
        &self,
        src: &TokenEntry,
        wpol: &TokenEntry,
        dst: &TokenEntry,
        amount_in: U256,
    ) -> Result<U256> {
        let hop_pair = self
            .probe
            .probe(src.address, wpol.address)
            .await
            .map_err(|err| AppError::no_route(&src.symbol, &dst.symbol, err))?;

        match hop_pair {
            PairLiquidity::NoPair => {
                return Err(AppError::no_route(
                    &src.symbol,
                    &dst.symbol,
                    AppError::NoPair { token_a: src.symbol.clone(), token_b: wpol.symbol.clone() },
                ));
            }
            PairLiquidity::Found { estimate, .. } if estimate < self.settings.min_liq_usd => {
                return Err(AppError::LowLiquidity {
                    leg: RouteLeg::ViaHop,
                    src: src.symbol.clone(),
                    dst: wpol.symbol.clone(),
                    estimate,
                    floor: self.settings.min_liq_usd,
                });
            }
            PairLiquidity::Found { .. } => {}
        }

        self.amounts_out(amount_in, vec![src.address, wpol.address, dst.address])
            .await
            .map_err(|err| AppError::no_route(&src.symbol, &dst.symbol, err))
    }

    /// `router.getAmountsOut`, returning the final element. A short or zero
    /// answer counts as a failure.
    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> Result<U256> {
        let hops = path.len();
        let amounts = call_contract(
            self.client.as_ref(),
            self.router,
            &IUniswapV2Router02::getAmountsOutCall { amountIn: amount_in, path },
        )
        .await?;

        if amounts.len() < hops {
            return Err(AppError::Decode(format!(
                "getAmountsOut returned {} amounts for a {}-token path",
                amounts.len(),
                hops
            )));
        }

        match amounts.last() {
            Some(amount_out) if !amount_out.is_zero() => Ok(*amount_out),
            _ => Err(AppError::ZeroOutput),
        }
    }
}

//! MCP server implementation.

use std::sync::Arc;

use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};

use crate::{
    config::Config,
    error::AppError,
    ethereum::{
        constants::{QUICKSWAP_V2_FACTORY, QUICKSWAP_V2_ROUTER},
        ChainClient, EthereumClient,
    },
    services::{ResolverSettings, RouteResolver, TokenRegistry},
    types::{parse_minor_units, ChainStatus, PairLiquidityInfo, QuoteRequest},
};

/// Polygon quote MCP server.
///
/// Provides tools for resolving QuickSwap V2 quotes and inspecting pair liquidity.
#[derive(Clone)]
pub struct QuoteServer {
    client: Arc<dyn ChainClient>,
    resolver: RouteResolver,
    tool_router: ToolRouter<Self>,
}

impl QuoteServer {
    /// Create a new server from configuration.
    ///
    /// Note: This uses lazy initialization - no network calls are made during
    /// server startup.
    pub fn new(config: Config) -> Result<Self, AppError> {
        tracing::info!("Initializing Polygon quote MCP server");

        let client: Arc<dyn ChainClient> =
            Arc::new(EthereumClient::new(&config.rpc_url, config.rpc_timeout)?);

        Ok(Self::with_client(client, ResolverSettings::from(&config)))
    }

    /// Create a server over an existing chain client.
    pub fn with_client(client: Arc<dyn ChainClient>, settings: ResolverSettings) -> Self {
        let registry = Arc::new(TokenRegistry::polygon());
        let resolver = RouteResolver::new(
            client.clone(),
            registry,
            QUICKSWAP_V2_ROUTER,
            QUICKSWAP_V2_FACTORY,
            settings,
        );

        tracing::info!(min_liq_usd = settings.min_liq_usd, "Polygon quote MCP server initialized");

        Self { client, resolver, tool_router: Self::tool_router() }
    }

    /// The resolver behind the `quote` tool.
    pub fn resolver(&self) -> &RouteResolver {
        &self.resolver
    }
}

/// Input parameters for the quote tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct QuoteInput {
    /// Token to sell (e.g., "USDT", "POL", "wmatic").
    pub src: String,
    /// Token to buy (e.g., "USDC", "SAND").
    pub dst: String,
    /// Amount to sell in the token's smallest unit, as a base-10 integer string.
    pub amount_in: String,
}

/// Input parameters for the pair_liquidity tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct PairLiquidityInput {
    /// First token symbol.
    pub token_a: String,
    /// Second token symbol.
    pub token_b: String,
}

#[tool_router]
impl QuoteServer {
    /// Quote a swap on QuickSwap V2.
    ///
    /// Tries the direct pair first, then a route through WPOL. Every traversed
    /// pair must meet the configured liquidity floor.
    #[tool(
        description = "Quote a token swap on QuickSwap V2 (Polygon). Returns buyAmount in the destination token's smallest unit. Falls back to routing through WPOL."
    )]
    pub async fn quote(
        &self,
        Parameters(input): Parameters<QuoteInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            src = %input.src,
            dst = %input.dst,
            amount_in = %input.amount_in,
            "quote called"
        );

        let amount_in = parse_minor_units(&input.amount_in)
            .map_err(|e| McpError::invalid_params(e, None))?;

        let request = QuoteRequest::new(input.src, input.dst, amount_in);
        let result = self.resolver.quote(&request).await.map_err(McpError::from)?;

        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// Inspect the reserves and liquidity estimate of a pair.
    #[tool(
        description = "Show reserves, token ordering and the liquidity estimate of the QuickSwap V2 pair for two tokens."
    )]
    pub async fn pair_liquidity(
        &self,
        Parameters(input): Parameters<PairLiquidityInput>,
    ) -> Result<String, McpError> {
        tracing::info!(token_a = %input.token_a, token_b = %input.token_b, "pair_liquidity called");

        let registry = self.resolver.registry();
        let token_a = registry.lookup(&input.token_a).map_err(McpError::from)?;
        let token_b = registry.lookup(&input.token_b).map_err(McpError::from)?;

        let liquidity = self
            .resolver
            .probe()
            .probe(token_a.address, token_b.address)
            .await
            .map_err(McpError::from)?;

        let info =
            PairLiquidityInfo::new(&liquidity, self.resolver.settings().min_liq_usd, |address| {
                registry.lookup_address(address).map(|entry| entry.info())
            });

        serde_json::to_string_pretty(&info)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// Probe the RPC endpoint.
    #[tool(description = "Check connectivity to the RPC endpoint and report chain ID and latest block.")]
    pub async fn chain_status(&self) -> Result<String, McpError> {
        tracing::info!("chain_status called");

        let status = if self.client.is_connected().await {
            let chain_id = self.client.chain_id().await.ok();
            let latest = self.client.latest_block().await.ok();
            ChainStatus {
                connected: true,
                chain_id,
                block_number: latest.as_ref().map(|b| b.number),
                extra_data_len: latest.as_ref().map(|b| b.extra_data_len),
            }
        } else {
            ChainStatus { connected: false, chain_id: None, block_number: None, extra_data_len: None }
        };

        serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for QuoteServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "polygon-quote-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Polygon quote MCP server. Resolves QuickSwap V2 quotes with a liquidity \
                 floor and a WPOL fallback route."
                    .to_string(),
            ),
        }
    }
}

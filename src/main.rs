//! Polygon Quote MCP Server
//!
//! A Model Context Protocol server for QuickSwap V2 quotes on Polygon.

use rmcp::ServiceExt;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polygon_quote_mcp::{Config, QuoteServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging. stdout carries the MCP protocol.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!(
        min_liq_usd = config.min_liq_usd,
        rpc_timeout = ?config.rpc_timeout,
        quote_timeout = ?config.quote_timeout,
        "Starting Polygon Quote MCP Server"
    );

    let server = QuoteServer::new(config)?;

    // Run with stdio transport
    let transport = rmcp::transport::stdio();
    let running = server.serve(transport).await?;

    running.waiting().await?;

    Ok(())
}

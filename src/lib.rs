//! Polygon Quote MCP Server Library
//!
//! A Model Context Protocol server that quotes QuickSwap V2 swaps on Polygon
//! PoS using read-only contract calls.
//!
//! # Features
//!
//! - **Quotes**: Router `getAmountsOut` on the direct pair, falling back to a
//!   single hop through WPOL
//! - **Liquidity Floor**: Every traversed pair is checked against a
//!   configurable minimum before the router is consulted
//! - **Pair Inspection**: Reserves, token ordering and liquidity estimates
//!
//! # Example
//!
//! ```rust,ignore
//! use alloy::primitives::U256;
//! use polygon_quote_mcp::{Config, QuoteRequest, QuoteServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let server = QuoteServer::new(config)?;
//!     let quote = server
//!         .resolver()
//!         .quote(&QuoteRequest::new("USDT", "USDC", U256::from(1_000_000u64)))
//!         .await?;
//!     println!("{}", quote.buy_amount);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod mcp;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::constants::*;
pub use mcp::QuoteServer;
pub use services::{ResolverSettings, RouteResolver, TokenRegistry};
pub use types::{QuoteRequest, QuoteResult};

//! MCP server module.
//!
//! Contains the MCP server implementation with tool handlers.

pub mod server;

pub use server::QuoteServer;
pub use server::{PairLiquidityInput, QuoteInput};

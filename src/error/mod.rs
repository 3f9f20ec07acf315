//! Error types and handling module.
//!
//! Defines all application-specific error types and conversions.

use rmcp::ErrorData as McpError;
use thiserror::Error;

use crate::types::RouteLeg;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Symbol not present in the token registry after normalization.
    #[error("Unsupported token: {0}")]
    UnsupportedToken(String),

    /// A traversed pair reported liquidity below the configured floor.
    #[error("Low liquidity on {leg} pair {src}/{dst}: {estimate} < {floor}")]
    LowLiquidity { leg: RouteLeg, src: String, dst: String, estimate: f64, floor: f64 },

    /// The factory returned the zero address for the pair.
    #[error("No pair for {token_a}/{token_b}")]
    NoPair { token_a: String, token_b: String },

    /// Transport, HTTP or timeout failure talking to the RPC endpoint.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The contract reverted the call.
    #[error("Contract reverted: {0}")]
    ContractRevert(String),

    /// The router answered, but with a zero output amount.
    #[error("Router quoted a zero output amount")]
    ZeroOutput,

    /// Return data did not match the expected ABI.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Both the direct path and the hop through WPOL were exhausted.
    #[error("No route from {src} to {dst}: {source}")]
    NoRoute {
        src: String,
        dst: String,
        #[source]
        source: Box<AppError>,
    },

    /// The request was cancelled by the caller.
    #[error("Quote request cancelled")]
    Cancelled,

    /// Invalid caller input.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl AppError {
    /// Wrap an error as the terminal `NoRoute` outcome for a request.
    pub fn no_route(src: &str, dst: &str, source: AppError) -> Self {
        AppError::NoRoute { src: src.to_string(), dst: dst.to_string(), source: Box::new(source) }
    }
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Rpc(err.to_string())
    }
}

impl From<alloy::sol_types::Error> for AppError {
    fn from(err: alloy::sol_types::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::UnsupportedToken(_) | AppError::Parse(_) => {
                McpError::invalid_params(err.to_string(), None)
            }
            AppError::Config(_) => McpError::invalid_request(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

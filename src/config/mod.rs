//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::AppError;

/// Environment variable holding the RPC endpoint. The name is historical; any
/// EVM-compatible HTTPS endpoint works.
pub const RPC_URL_ENV: &str = "ALCHEMY_POLYGON_RPC";

/// Default liquidity floor in USD.
pub const DEFAULT_MIN_LIQ_USD: f64 = 10_000.0;

/// Default deadline for a single `eth_call`.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Default deadline for a whole quote request.
pub const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    /// JSON-RPC endpoint URL. May embed an API key.
    pub rpc_url: SecretString,
    /// Liquidity floor a traversed pair must meet.
    pub min_liq_usd: f64,
    /// Per-call RPC deadline.
    pub rpc_timeout: Duration,
    /// Per-request deadline.
    pub quote_timeout: Duration,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ALCHEMY_POLYGON_RPC`: JSON-RPC endpoint
    ///
    /// Optional environment variables:
    /// - `MIN_LIQ_USD`: Liquidity floor (default: 10000)
    /// - `RPC_TIMEOUT_SECS`: Per-call deadline (default: 5)
    /// - `QUOTE_TIMEOUT_SECS`: Per-request deadline (default: 30)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup(RPC_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config(format!("{RPC_URL_ENV} environment variable not set")))?;

        let min_liq_usd = match lookup("MIN_LIQ_USD") {
            Some(raw) => parse_min_liq(&raw)?,
            None => DEFAULT_MIN_LIQ_USD,
        };

        let rpc_timeout = parse_secs(&lookup, "RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT)?;
        let quote_timeout = parse_secs(&lookup, "QUOTE_TIMEOUT_SECS", DEFAULT_QUOTE_TIMEOUT)?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            rpc_url: SecretString::from(rpc_url.trim().to_string()),
            min_liq_usd,
            rpc_timeout,
            quote_timeout,
            log_level,
        })
    }
}

fn parse_min_liq(raw: &str) -> Result<f64, AppError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("MIN_LIQ_USD is not a number: {raw}")))?;

    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Config(format!(
            "MIN_LIQ_USD must be a finite non-negative number, got {raw}"
        )));
    }

    Ok(value)
}

fn parse_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(AppError::Config(format!("{key} must be a positive integer, got {raw}"))),
        },
    }
}

//! Ethereum interaction module.
//!
//! Contains the JSON-RPC client, the `ChainClient` seam used by the services,
//! network constants and contract bindings.

pub mod client;
pub mod constants;
pub mod contracts;

pub use client::{call_contract, BlockSummary, ChainClient, EthereumClient, HttpProvider};

//! Smart contract bindings.

pub mod uniswap_v2;

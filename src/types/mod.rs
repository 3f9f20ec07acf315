//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod quote;
pub mod token;

pub use quote::*;
pub use token::*;

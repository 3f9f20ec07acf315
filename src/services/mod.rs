//! Business logic services module.

pub mod pair_probe;
pub mod route_resolver;
pub mod token_registry;

pub use pair_probe::PairProbe;
pub use route_resolver::{ResolverSettings, RouteResolver};
pub use token_registry::{TokenEntry, TokenRegistry};

//! carimage library
//!
//! Resolves a representative photo URL for a car (brand, model, year) using
//! a memory tier, a persisted session store, provider URL synthesis and a
//! media search fallback.

pub mod cache;
pub mod cli;
pub mod data;
pub mod resolver;

pub use data::CarImageDescriptor;
pub use resolver::{CarImageResolver, ResolverConfig, ResolverError};

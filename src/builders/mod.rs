//! Construction helpers for building one or more pools from configuration.

pub mod pool_builder;

pub use pool_builder::build_pools;

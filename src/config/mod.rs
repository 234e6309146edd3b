//! Validated configuration blueprints for the engine components.
//!
//! Each config struct is constructed through a validating `new` and can be
//! re-validated after deserialization with `validate()`.  Parameter loading
//! itself (files, environment) is owned by the embedding application.

mod optimizer;
mod pool;
mod strategy;

pub use optimizer::OptimizerConfig;
pub use pool::{PoolConfig, DEFAULT_DEGRADATION_RATE};
pub use strategy::StrategyConfig;

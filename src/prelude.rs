//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use tidal_amm::prelude::*;
//! ```

// Re-export domain types
pub use crate::domain::{
    AccountId, AllocationQuote, Amount, AssetIndex, BasisPoints, Rounding, Shares, SwapQuote,
};

// Re-export core traits
pub use crate::traits::{NoReserves, ReserveSource, Vault};

// Re-export configuration
pub use crate::config::{OptimizerConfig, PoolConfig, StrategyConfig, DEFAULT_DEGRADATION_RATE};

// Re-export the engine components
pub use crate::optimizer::HybridOptimizer;
pub use crate::pool::StablePool;
pub use crate::strategy::{SimVault, YieldStrategy};

// Re-export error types
pub use crate::error::{EngineError, Result};

//! Hybrid allocation optimizer.

mod hybrid;

pub use hybrid::HybridOptimizer;

//! Model training orchestration.
//!
//! Responsibilities:
//!
//! - seeded train/test split
//! - train each regressor family per target (parallel)
//! - select the best model per target by held-out R²
//! - project targets under the policy scenarios

pub mod selection;
pub mod split;

pub use selection::*;
pub use split::*;

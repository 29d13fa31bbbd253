//! Mathematical utilities: least squares, scaling and descriptive statistics.

pub mod ols;
pub mod scale;
pub mod stats;

pub use ols::*;
pub use scale::StandardScaler;

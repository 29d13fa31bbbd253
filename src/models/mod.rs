//! Regressors used to project ROI, human capital and poverty reduction.
//!
//! Everything is built from a single CART regression tree plus penalized
//! linear least squares.

pub mod ensemble;
pub mod linear;
pub mod model;
pub mod tree;

pub use model::*;

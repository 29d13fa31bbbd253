//! Terminal reports for the pipeline commands.

pub mod format;

pub use format::*;

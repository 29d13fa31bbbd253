//! Input/output helpers.
//!
//! - guarded writes and filename sanitizing (`write`)
//! - HTML page rendering for figures (`html`)
//! - scenario CSV export (`export`)
//! - trained model JSON (`model_store`)

pub mod export;
pub mod html;
pub mod model_store;
pub mod write;

pub use export::*;
pub use html::*;
pub use model_store::*;
pub use write::*;

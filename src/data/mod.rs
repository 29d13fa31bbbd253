//! Data sources: literal indicator tables and their on-disk caches.

pub mod collector;
pub mod tables;

pub use collector::{CollectionMetadata, build_catalog, collect_all};
pub use tables::*;

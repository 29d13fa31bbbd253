//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - literal dataset records (`EducationRecord`, `MobilityRecord`, ...)
//! - the `DataCatalog` that bundles them for one run
//! - modelling identifiers (`Target`, `ModelKind`, `PolicyScenario`)
//! - prediction outputs (`FitQuality`, `ScenarioPrediction`)

pub mod types;

pub use types::*;

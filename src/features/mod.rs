//! Feature engineering and policy scenario transforms.

pub mod engineer;
pub mod scenario;

pub use engineer::{FEATURE_NAMES, FeatureRow, FeatureTable, innovation_score, prepare_features};
pub use scenario::{all_scenarios, apply_scenario};

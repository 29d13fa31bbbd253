//! Dashboard figures built from the catalog and model projections.
//!
//! - state and international comparisons (`policy`)
//! - scenario ROI projections (`roi`)
//! - 3D policy space, trajectories and ROI surface (`spatial`)

pub mod policy;
pub mod roi;
pub mod spatial;

pub use policy::{
    COMPARISON_STATES, ComparisonRow, comparison_rows, education_impact_dashboard,
    international_comparison_dashboard, policy_comparison_dashboard, policy_scores,
};
pub use roi::{average_roi_by_scenario, roi_prediction_dashboard};
pub use spatial::{
    animated_trajectories, impact_surface, policy_space_explorer, policy_space_points,
    render_3d_dashboard,
};

/// Page names (without `.html`) written into the web directory.
pub const EDUCATION_IMPACT_PAGE: &str = "education_impact_dashboard";
pub const POLICY_COMPARISON_PAGE: &str = "policy_comparison_dashboard";
pub const INTERNATIONAL_PAGE: &str = "international_comparison_dashboard";
pub const ML_ROI_PAGE: &str = "ml_roi_predictions_dashboard";
pub const ADVANCED_3D_PAGE: &str = "advanced_3d_dashboard";

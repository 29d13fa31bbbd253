//! Export scenario predictions to CSV.
//!
//! One row per (scenario, state), in prediction order.

use std::path::Path;

use crate::domain::ScenarioPrediction;
use crate::error::AppError;

pub const SCENARIO_HEADER: [&str; 6] = [
    "scenario",
    "state",
    "roi_20yr_predicted",
    "human_capital_predicted",
    "poverty_reduction_predicted",
    "policy_innovation_score",
];

/// Write scenario predictions to a CSV file.
pub fn write_scenarios_csv(path: &Path, predictions: &[ScenarioPrediction]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::io(format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    let mut w = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    w.write_record(SCENARIO_HEADER)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for p in predictions {
        w.write_record([
            p.scenario.display_name().to_string(),
            p.state.clone(),
            format!("{:.4}", p.roi_20yr),
            format!("{:.4}", p.human_capital),
            format!("{:.4}", p.poverty_reduction),
            format!("{:.1}", p.policy_innovation_score),
        ])
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    w.flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PolicyScenario;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/scenarios.csv");
        let rows = vec![ScenarioPrediction {
            scenario: PolicyScenario::MassachusettsModel,
            state: "TX".into(),
            roi_20yr: 3.25,
            human_capital: 61.0,
            poverty_reduction: 12.5,
            policy_innovation_score: 25.0,
        }];
        write_scenarios_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SCENARIO_HEADER.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "Massachusetts Model,TX,3.2500,61.0000,12.5000,25.0"
        );
        assert!(lines.next().is_none());
    }
}

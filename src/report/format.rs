//! Formatted terminal output for collection, training and scenario runs.
//!
//! Formatting stays here so the modelling code returns plain data.

use crate::dashboards::average_roi_by_scenario;
use crate::domain::{DataCatalog, ScenarioPrediction};
use crate::features::FEATURE_NAMES;
use crate::fit::ModelSuite;

/// How many features to list per target.
pub const TOP_FEATURES: usize = 5;

/// Row counts per dataset.
pub fn format_collection_summary(catalog: &DataCatalog) -> String {
    let mut out = String::new();
    out.push_str("=== hci - data collection ===\n");
    let counts = [
        catalog.education.len(),
        catalog.mobility.len(),
        catalog.health.len(),
        catalog.nutrition.len(),
        catalog.international.len(),
    ];
    for (name, n) in catalog.dataset_names().iter().zip(counts) {
        out.push_str(&format!("{name:<14} {n:>4} records\n"));
    }
    out.push_str(&format!("{:<14} {:>4} records\n", "total", catalog.total_records()));
    out
}

/// Held-out scores per target; `*` marks the selected model.
pub fn format_training_summary(suite: &ModelSuite) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== hci - model training (seed={}) ===\n", suite.seed));

    for fit in &suite.targets {
        out.push_str(&format!("\n{} [{}]\n", fit.target.display_name(), fit.target.key()));
        push_line(
            &mut out,
            format!("  {:<20} {:>10} {:>12} {:>12} {:>6}", "model", "R2", "MSE", "MAE", "n"),
        );
        push_line(&mut out, format!("  {:-<20} {:-<10} {:-<12} {:-<12} {:-<6}", "", "", "", "", ""));
        for score in &fit.scores {
            let chosen = if score.kind == fit.best_kind { "*" } else { " " };
            push_line(
                &mut out,
                format!(
                    "{chosen} {:<20} {:>10.4} {:>12.4} {:>12.4} {:>6}",
                    score.kind.display_name(),
                    score.quality.r2,
                    score.quality.mse,
                    score.quality.mae,
                    score.quality.n_test
                ),
            );
        }

        if let Some(best) = fit.best_score() {
            let top = top_features(&best.feature_importance, TOP_FEATURES);
            if !top.is_empty() {
                let listed: Vec<String> = top.iter().map(|(name, w)| format!("{name} ({w:.3})")).collect();
                out.push_str(&format!("  top features: {}\n", listed.join(", ")));
            }
        }
    }
    out
}

/// Mean predicted ROI per scenario and the best state under each.
pub fn format_scenario_summary(predictions: &[ScenarioPrediction]) -> String {
    let mut out = String::new();
    out.push_str("=== hci - policy scenarios ===\n");
    push_line(&mut out, format!("{:<24} {:>10} {:>10}", "scenario", "avg ROI", "best"));
    push_line(&mut out, format!("{:-<24} {:-<10} {:-<10}", "", "", ""));

    for (scenario, avg) in average_roi_by_scenario(predictions) {
        let best = predictions
            .iter()
            .filter(|p| p.scenario == scenario)
            .max_by(|a, b| a.roi_20yr.total_cmp(&b.roi_20yr))
            .map(|p| p.state.as_str())
            .unwrap_or("-");
        push_line(
            &mut out,
            format!("{:<24} {:>9.2}x {:>10}", truncate(scenario.display_name(), 24), avg, best),
        );
    }
    out
}

/// Largest `n` importances paired with their feature names, descending.
pub fn top_features(importance: &[f64], n: usize) -> Vec<(&'static str, f64)> {
    let mut pairs: Vec<(&'static str, f64)> = FEATURE_NAMES
        .iter()
        .copied()
        .zip(importance.iter().copied())
        .filter(|(_, w)| w.is_finite())
        .collect();
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs.truncate(n);
    pairs
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "~"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::build_catalog;
    use crate::domain::PolicyScenario;
    use chrono::Local;

    #[test]
    fn collection_summary_counts_rows() {
        let out = format_collection_summary(&build_catalog(Local::now()));
        assert!(out.contains("education        10 records"));
        assert!(out.contains("total            46 records"));
    }

    #[test]
    fn top_features_sorted_and_named() {
        let mut importance = vec![0.0; FEATURE_NAMES.len()];
        importance[3] = 0.5;
        importance[7] = 0.9;
        importance[1] = f64::NAN;
        let top = top_features(&importance, 2);
        assert_eq!(top, vec![(FEATURE_NAMES[7], 0.9), (FEATURE_NAMES[3], 0.5)]);
    }

    #[test]
    fn scenario_summary_names_best_state() {
        let p = |scenario, state: &str, roi| ScenarioPrediction {
            scenario,
            state: state.into(),
            roi_20yr: roi,
            human_capital: 0.0,
            poverty_reduction: 0.0,
            policy_innovation_score: 0.0,
        };
        let predictions = vec![
            p(PolicyScenario::StatusQuo, "MA", 4.0),
            p(PolicyScenario::StatusQuo, "TX", 2.0),
        ];
        let out = format_scenario_summary(&predictions);
        let line = out.lines().find(|l| l.starts_with("Status Quo")).unwrap();
        assert!(line.contains("3.00x"));
        assert!(line.ends_with("MA"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }
}

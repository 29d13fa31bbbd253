//! Dashboard of model projections under the policy scenarios.

use serde_json::json;

use crate::chart::{Figure, PolicyTheme, SubplotGrid, Trace};
use crate::domain::{PolicyScenario, ScenarioPrediction};
use crate::error::AppError;
use crate::math::stats::mean;

const SCENARIO_COLORS: [&str; 4] = ["success", "massachusetts", "education", "health"];

fn scenario_color(index: usize) -> &'static str {
    PolicyTheme::color(SCENARIO_COLORS[index % SCENARIO_COLORS.len()])
}

/// Scenarios in first-seen order.
fn scenarios_in(predictions: &[ScenarioPrediction]) -> Vec<PolicyScenario> {
    let mut seen = Vec::new();
    for p in predictions {
        if !seen.contains(&p.scenario) {
            seen.push(p.scenario);
        }
    }
    seen
}

fn rows_for(predictions: &[ScenarioPrediction], scenario: PolicyScenario) -> Vec<&ScenarioPrediction> {
    predictions.iter().filter(|p| p.scenario == scenario).collect()
}

/// Mean predicted 20-year ROI per scenario.
pub fn average_roi_by_scenario(predictions: &[ScenarioPrediction]) -> Vec<(PolicyScenario, f64)> {
    scenarios_in(predictions)
        .into_iter()
        .map(|s| {
            let roi: Vec<f64> = rows_for(predictions, s).iter().map(|p| p.roi_20yr).collect();
            (s, mean(&roi).unwrap_or(f64::NAN))
        })
        .collect()
}

pub fn roi_prediction_dashboard(predictions: &[ScenarioPrediction]) -> Result<Figure, AppError> {
    if predictions.is_empty() {
        return Err(AppError::data("No scenario predictions to chart."));
    }

    let grid = SubplotGrid::new(2, 2).titles(&[
        "Predicted 20-Year ROI by Policy Scenario",
        "Human Capital Development Projections",
        "Poverty Reduction Potential by State",
        "Policy Innovation vs Predicted Outcomes",
    ]);
    let mut fig = grid.figure();
    let scenarios = scenarios_in(predictions);

    for (i, (scenario, avg)) in average_roi_by_scenario(predictions).into_iter().enumerate() {
        let name = scenario.display_name();
        fig.add_trace(
            Trace::bar(name, vec![name], vec![avg])
                .marker(json!({"color": scenario_color(i)}))
                .showlegend(true)
                .hovertemplate(format!("<b>{name}</b><br>Average ROI: {avg:.2}x<extra></extra>"))
                .in_cell(&grid.cell(1, 1)),
        );
    }

    for (i, &scenario) in scenarios.iter().enumerate() {
        let rows = rows_for(predictions, scenario);
        let name = scenario.display_name();
        fig.add_trace(
            Trace::scatter(
                &format!("{name} HC"),
                rows.iter().map(|p| p.state.clone()).collect::<Vec<_>>(),
                rows.iter().map(|p| p.human_capital).collect::<Vec<_>>(),
                "lines+markers",
            )
            .line(json!({"color": scenario_color(i), "width": 2}))
            .marker(json!({"size": 6}))
            .showlegend(false)
            .hovertemplate(format!("<b>{name}</b><br>%{{x}}: %{{y:.1f}}<extra></extra>"))
            .in_cell(&grid.cell(1, 2)),
        );
    }

    for (scenario, color) in [
        (PolicyScenario::StatusQuo, "poverty"),
        (PolicyScenario::ComprehensiveReform, "success"),
    ] {
        let rows = rows_for(predictions, scenario);
        fig.add_trace(
            Trace::bar(
                scenario.display_name(),
                rows.iter().map(|p| p.state.clone()).collect::<Vec<_>>(),
                rows.iter().map(|p| p.poverty_reduction).collect::<Vec<_>>(),
            )
            .marker(json!({"color": PolicyTheme::color(color)}))
            .showlegend(true)
            .in_cell(&grid.cell(2, 1)),
        );
    }

    for (i, &scenario) in scenarios.iter().enumerate() {
        let rows = rows_for(predictions, scenario);
        let name = scenario.display_name();
        fig.add_trace(
            Trace::scatter(
                &format!("{name} Innovation"),
                rows.iter().map(|p| p.policy_innovation_score).collect::<Vec<_>>(),
                rows.iter().map(|p| p.roi_20yr).collect::<Vec<_>>(),
                "markers",
            )
            .marker(json!({
                "size": 10,
                "color": scenario_color(i),
                "line": PolicyTheme::white_outline(1)
            }))
            .showlegend(false)
            .hovertemplate(format!("<b>{name}</b><br>Innovation: %{{x}}<br>ROI: %{{y:.2f}}x<extra></extra>"))
            .in_cell(&grid.cell(2, 2)),
        );
    }

    fig.update_layout(PolicyTheme::dashboard_layout(
        "ML-Powered Human Capital Investment ROI Predictions: Strategic Policy Analysis",
        1300,
        900,
    ));
    for (row, col, x_title, y_title) in [
        (1, 1, "Policy Scenario", "Average ROI (x)"),
        (1, 2, "State", "Human Capital Score"),
        (2, 1, "State", "Poverty Reduction Potential"),
        (2, 2, "Policy Innovation Score", "Predicted 20-Year ROI"),
    ] {
        fig.update_layout(grid.axis_titles(row, col, x_title, y_title));
    }
    fig.update_axes(&PolicyTheme::axis_grid());
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(scenario: PolicyScenario, state: &str, roi: f64) -> ScenarioPrediction {
        ScenarioPrediction {
            scenario,
            state: state.into(),
            roi_20yr: roi,
            human_capital: 50.0,
            poverty_reduction: 10.0,
            policy_innovation_score: 20.0,
        }
    }

    fn sample() -> Vec<ScenarioPrediction> {
        PolicyScenario::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, &s)| {
                vec![
                    prediction(s, "MA", 4.0 + i as f64),
                    prediction(s, "TX", 2.0 + i as f64),
                ]
            })
            .collect()
    }

    #[test]
    fn averages_per_scenario_in_order() {
        let avg = average_roi_by_scenario(&sample());
        assert_eq!(avg.len(), 4);
        assert_eq!(avg[0], (PolicyScenario::StatusQuo, 3.0));
        assert_eq!(avg[3], (PolicyScenario::ComprehensiveReform, 6.0));
    }

    #[test]
    fn dashboard_trace_layout() {
        let fig = roi_prediction_dashboard(&sample()).unwrap();
        // 4 ROI bars + 4 HC lines + 2 poverty bars + 4 innovation scatters.
        assert_eq!(fig.data.len(), 14);
        assert_eq!(fig.layout["width"], 1300);
        assert_eq!(fig.layout["height"], 900);
        let first = fig.data[0].hovertemplate.as_deref().unwrap();
        assert!(first.contains("Average ROI: 3.00x"));
        // Default spacing: 0.1 across, 0.15 down.
        assert_eq!(fig.layout["xaxis2"]["domain"][0], 0.55);
        assert_eq!(fig.layout["yaxis4"]["title"]["text"], "<b>Predicted 20-Year ROI</b>");
    }

    #[test]
    fn empty_predictions_fail() {
        assert_eq!(roi_prediction_dashboard(&[]).unwrap_err().exit_code(), 3);
    }
}

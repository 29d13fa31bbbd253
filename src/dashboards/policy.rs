//! Descriptive 2×2 dashboards built straight from the collected tables.

use serde_json::json;
use tracing::debug;

use crate::chart::{Figure, PolicyTheme, SubplotGrid, Trace};
use crate::domain::{BENCHMARK_COUNTRY, BENCHMARK_STATE, DataCatalog, MobilityRecord};
use crate::error::AppError;
use crate::math::stats::{correlation_matrix, max, mean};

/// States shown on the policy comparison dashboard.
pub const COMPARISON_STATES: [&str; 5] = ["MA", "TX", "CA", "NY", "FL"];

const DASHBOARD_WIDTH: u32 = 1200;
const DASHBOARD_HEIGHT: u32 = 800;

fn dashboard_grid(titles: &[&str]) -> SubplotGrid {
    SubplotGrid::new(2, 2).spacing(0.1, 0.12).titles(titles)
}

fn finish(mut fig: Figure, title: &str) -> Figure {
    fig.update_layout(PolicyTheme::dashboard_layout(title, DASHBOARD_WIDTH, DASHBOARD_HEIGHT));
    fig.update_axes(&PolicyTheme::axis_grid());
    fig
}

/// NAEP comparison, mobility ranking, scores vs mobility and a correlation matrix.
pub fn education_impact_dashboard(catalog: &DataCatalog) -> Result<Figure, AppError> {
    if catalog.education.is_empty() || catalog.mobility.is_empty() {
        return Err(AppError::data("Education and mobility data required."));
    }
    let ma = catalog
        .education_for(BENCHMARK_STATE)
        .ok_or_else(|| AppError::data("Education data has no Massachusetts row."))?;

    let grid = dashboard_grid(&[
        "NAEP Scores: Massachusetts vs National Average",
        "Economic Mobility by State",
        "Education Performance vs Economic Outcomes",
        "Policy Impact Correlation Matrix",
    ]);
    let mut fig = grid.figure();

    // Benchmark vs mean of all states.
    let math: Vec<f64> = catalog.education.iter().map(|r| r.math_8th_grade).collect();
    let reading: Vec<f64> = catalog.education.iter().map(|r| r.reading_8th_grade).collect();
    let categories = vec!["Math (8th Grade)", "Reading (8th Grade)"];
    let national = vec![mean(&math).unwrap_or(f64::NAN), mean(&reading).unwrap_or(f64::NAN)];

    let c11 = grid.cell(1, 1);
    fig.add_trace(
        Trace::bar("Massachusetts", categories.clone(), vec![ma.math_8th_grade, ma.reading_8th_grade])
            .marker(json!({"color": PolicyTheme::color("massachusetts")}))
            .showlegend(true)
            .in_cell(&c11),
    );
    fig.add_trace(
        Trace::bar("National Average", categories, national)
            .marker(json!({"color": PolicyTheme::color("national")}))
            .showlegend(true)
            .in_cell(&c11),
    );

    // Mobility ascending, benchmark highlighted.
    let mut mobility: Vec<&MobilityRecord> = catalog.mobility.iter().collect();
    mobility.sort_by(|a, b| a.mobility_index.total_cmp(&b.mobility_index));
    let states: Vec<String> = mobility.iter().map(|r| r.state.clone()).collect();
    fig.add_trace(
        Trace::bar(
            "Economic Mobility Index",
            states.clone(),
            mobility.iter().map(|r| r.mobility_index).collect::<Vec<_>>(),
        )
        .marker(json!({"color": PolicyTheme::highlight(&states, PolicyTheme::color("neutral"))}))
        .showlegend(false)
        .hovertemplate("<b>%{x}</b><br>Mobility Index: %{y:.1f}<extra></extra>")
        .in_cell(&grid.cell(1, 2)),
    );

    // Inner join on state, education order.
    let merged: Vec<_> = catalog
        .education
        .iter()
        .filter_map(|e| catalog.mobility_for(&e.state).map(|m| (e, m)))
        .collect();
    let merged_states: Vec<String> = merged.iter().map(|(e, _)| e.state.clone()).collect();
    fig.add_trace(
        Trace::scatter(
            "States",
            merged.iter().map(|(e, _)| e.math_8th_grade).collect::<Vec<_>>(),
            merged.iter().map(|(_, m)| m.mobility_index).collect::<Vec<_>>(),
            "markers+text",
        )
        .marker(json!({
            "size": 12,
            "color": PolicyTheme::highlight(&merged_states, PolicyTheme::color("education")),
            "line": PolicyTheme::white_outline(2)
        }))
        .text(&merged_states)
        .textposition("top center")
        .showlegend(false)
        .hovertemplate("<b>%{text}</b><br>Math Score: %{x}<br>Mobility: %{y:.1f}<extra></extra>")
        .in_cell(&grid.cell(2, 1)),
    );

    if merged.len() > 3 {
        let columns = vec![
            merged.iter().map(|(e, _)| e.math_8th_grade).collect(),
            merged.iter().map(|(e, _)| e.reading_8th_grade).collect(),
            merged.iter().map(|(_, m)| m.mobility_index).collect(),
            merged.iter().map(|(_, m)| m.income_25th_percentile).collect(),
        ];
        let labels = vec!["Math Score", "Reading Score", "Mobility", "Income 25th %ile"];
        fig.add_trace(
            Trace::heatmap("Correlations", correlation_matrix(&columns), labels.clone(), labels)
                .colorscale("RdYlBu_r")
                .showscale(true)
                .hovertemplate("<b>%{y} vs %{x}</b><br>Correlation: %{z:.2f}<extra></extra>")
                .in_cell(&grid.cell(2, 2)),
        );
    } else {
        debug!(rows = merged.len(), "too few joined rows for a correlation matrix");
    }
    fig.update_layout(grid.axis_titles(2, 1, "Math Score (8th Grade)", "Economic Mobility Index"));

    Ok(finish(
        fig,
        "Strategic Human Capital Investment: Massachusetts Model vs Current National Policies",
    ))
}

/// Indicators gathered for one comparison state; any may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonRow {
    pub state: String,
    pub math: Option<f64>,
    pub reading: Option<f64>,
    pub mobility: Option<f64>,
    pub child_mortality: Option<f64>,
    pub uninsured: Option<f64>,
    pub free_lunch: Option<f64>,
    pub universal: Option<bool>,
}

impl ComparisonRow {
    fn has_any(&self) -> bool {
        self.math.is_some()
            || self.mobility.is_some()
            || self.uninsured.is_some()
            || self.free_lunch.is_some()
    }
}

pub fn comparison_rows(catalog: &DataCatalog) -> Vec<ComparisonRow> {
    COMPARISON_STATES
        .iter()
        .map(|&state| {
            let edu = catalog.education_for(state);
            let mob = catalog.mobility_for(state);
            let health = catalog.health_for(state);
            let nutr = catalog.nutrition_for(state);
            ComparisonRow {
                state: state.to_string(),
                math: edu.map(|r| r.math_8th_grade),
                reading: edu.map(|r| r.reading_8th_grade),
                mobility: mob.map(|r| r.mobility_index),
                child_mortality: health.map(|r| r.child_mortality_rate),
                uninsured: health.map(|r| r.uninsured_children_pct),
                free_lunch: nutr.map(|r| r.free_lunch_eligible_pct),
                universal: nutr.map(|r| r.universal_meals),
            }
        })
        .filter(ComparisonRow::has_any)
        .collect()
}

/// Composite effectiveness score (0..100).
///
/// `(math/max·0.3 + mobility/max·0.3 + (100 − uninsured)/100·0.2 + universal·0.2)·100`.
/// The maxima run over every row reporting that column. Rows missing any of
/// the four inputs get no score and are left out.
pub fn policy_scores(rows: &[ComparisonRow]) -> Vec<(String, f64)> {
    let math_max = max(&rows.iter().filter_map(|r| r.math).collect::<Vec<_>>()).unwrap_or(1.0);
    let mob_max = max(&rows.iter().filter_map(|r| r.mobility).collect::<Vec<_>>()).unwrap_or(1.0);

    rows.iter()
        .filter_map(|r| {
            let (math, mob, uninsured, universal) = (r.math?, r.mobility?, r.uninsured?, r.universal?);
            let health = (100.0 - uninsured) / 100.0;
            let universal = if universal { 1.0 } else { 0.0 };
            let score = (math / math_max * 0.3 + mob / mob_max * 0.3 + health * 0.2 + universal * 0.2) * 100.0;
            Some((r.state.clone(), score))
        })
        .collect()
}

/// Academic, health, universal-meal and composite views for the five comparison states.
pub fn policy_comparison_dashboard(catalog: &DataCatalog) -> Result<Figure, AppError> {
    let rows = comparison_rows(catalog);
    if rows.is_empty() {
        return Err(AppError::data("No data available for the policy comparison dashboard."));
    }

    let grid = dashboard_grid(&[
        "Academic Performance by State",
        "Health Outcomes vs Policy Investment",
        "Universal Programs Impact",
        "Comprehensive Policy Effectiveness",
    ]);
    let mut fig = grid.figure();

    let academic: Vec<&ComparisonRow> = rows.iter().filter(|r| r.math.is_some() && r.reading.is_some()).collect();
    if !academic.is_empty() {
        let states: Vec<String> = academic.iter().map(|r| r.state.clone()).collect();
        let c = grid.cell(1, 1);
        fig.add_trace(
            Trace::bar("Math Score", states.clone(), academic.iter().filter_map(|r| r.math).collect::<Vec<_>>())
                .marker(json!({"color": PolicyTheme::color("education")}))
                .showlegend(true)
                .in_cell(&c),
        );
        fig.add_trace(
            Trace::bar("Reading Score", states, academic.iter().filter_map(|r| r.reading).collect::<Vec<_>>())
                .marker(json!({"color": PolicyTheme::color("success")}))
                .showlegend(true)
                .in_cell(&c),
        );
    }

    let health: Vec<&ComparisonRow> = rows
        .iter()
        .filter(|r| r.uninsured.is_some() && r.child_mortality.is_some())
        .collect();
    if !health.is_empty() {
        let states: Vec<String> = health.iter().map(|r| r.state.clone()).collect();
        fig.add_trace(
            Trace::scatter(
                "Health Outcomes",
                health.iter().filter_map(|r| r.uninsured).collect::<Vec<_>>(),
                health.iter().filter_map(|r| r.child_mortality).collect::<Vec<_>>(),
                "markers+text",
            )
            .marker(json!({
                "size": 15,
                "color": PolicyTheme::highlight(&states, PolicyTheme::color("health")),
                "line": PolicyTheme::white_outline(2)
            }))
            .text(&states)
            .textposition("top center")
            .showlegend(false)
            .hovertemplate("<b>%{text}</b><br>Uninsured: %{x:.1f}%<br>Child Mortality: %{y:.1f}<extra></extra>")
            .in_cell(&grid.cell(1, 2)),
        );
    }

    let meals: Vec<&ComparisonRow> = rows
        .iter()
        .filter(|r| r.universal.is_some() && r.free_lunch.is_some())
        .collect();
    if !meals.is_empty() {
        let c = grid.cell(2, 1);
        for (universal, name, color) in [
            (true, "Universal Meal States", "success"),
            (false, "Non-Universal States", "poverty"),
        ] {
            let group: Vec<&&ComparisonRow> = meals.iter().filter(|r| r.universal == Some(universal)).collect();
            fig.add_trace(
                Trace::bar(
                    name,
                    group.iter().map(|r| r.state.clone()).collect::<Vec<_>>(),
                    group.iter().filter_map(|r| r.free_lunch).collect::<Vec<_>>(),
                )
                .marker(json!({"color": PolicyTheme::color(color)}))
                .showlegend(true)
                .in_cell(&c),
            );
        }
    }

    let scores = policy_scores(&rows);
    if !scores.is_empty() {
        let values: Vec<f64> = scores.iter().map(|(_, s)| *s).collect();
        fig.add_trace(
            Trace::scatter(
                "Policy Effectiveness",
                scores.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>(),
                values.clone(),
                "markers+lines",
            )
            .marker(json!({
                "size": 15,
                "color": values,
                "colorscale": "Viridis",
                "showscale": true,
                "colorbar": {"title": {"text": "Policy Score"}, "x": 1.1}
            }))
            .line(json!({"color": PolicyTheme::color("education"), "width": 3}))
            .showlegend(false)
            .hovertemplate("<b>%{x}</b><br>Policy Score: %{y:.1f}<extra></extra>")
            .in_cell(&grid.cell(2, 2)),
        );
    }

    Ok(finish(
        fig,
        "Human Capital ROI Analysis: Evidence-Based Investment Strategy vs Status Quo",
    ))
}

/// Spending vs poverty, PISA, social mobility and Massachusetts vs the international mean.
pub fn international_comparison_dashboard(catalog: &DataCatalog) -> Result<Figure, AppError> {
    let intl = &catalog.international;
    if intl.is_empty() {
        return Err(AppError::data("International data required."));
    }
    let ma = intl
        .iter()
        .find(|r| r.country == BENCHMARK_COUNTRY)
        .ok_or_else(|| AppError::data("International data has no Massachusetts row."))?;

    let grid = dashboard_grid(&[
        "Education Investment vs Child Poverty",
        "PISA Performance Comparison",
        "Social Mobility International Ranking",
        "Massachusetts in Global Context",
    ]);
    let mut fig = grid.figure();
    let intl_color = PolicyTheme::color("international");

    let countries: Vec<String> = intl.iter().map(|r| r.country.clone()).collect();
    fig.add_trace(
        Trace::scatter(
            "Countries/States",
            intl.iter().map(|r| r.education_spending_gdp).collect::<Vec<_>>(),
            intl.iter().map(|r| r.child_poverty_rate).collect::<Vec<_>>(),
            "markers+text",
        )
        .marker(json!({
            "size": 12,
            "color": PolicyTheme::highlight(&countries, intl_color),
            "line": PolicyTheme::white_outline(2)
        }))
        .text(&countries)
        .textposition("top center")
        .showlegend(false)
        .hovertemplate("<b>%{text}</b><br>Education Spending: %{x:.1f}% GDP<br>Child Poverty: %{y:.1f}%<extra></extra>")
        .in_cell(&grid.cell(1, 1)),
    );

    let mut by_pisa: Vec<_> = intl.iter().collect();
    by_pisa.sort_by(|a, b| a.pisa_math_score.total_cmp(&b.pisa_math_score));
    let pisa_labels: Vec<String> = by_pisa.iter().map(|r| r.country.clone()).collect();
    fig.add_trace(
        Trace::bar(
            "PISA Math Score",
            pisa_labels.clone(),
            by_pisa.iter().map(|r| r.pisa_math_score).collect::<Vec<_>>(),
        )
        .marker(json!({"color": PolicyTheme::highlight(&pisa_labels, intl_color)}))
        .showlegend(false)
        .hovertemplate("<b>%{x}</b><br>PISA Score: %{y}<extra></extra>")
        .in_cell(&grid.cell(1, 2)),
    );

    let mut by_mobility: Vec<_> = intl.iter().collect();
    by_mobility.sort_by(|a, b| b.social_mobility_index.total_cmp(&a.social_mobility_index));
    let mobility_labels: Vec<String> = by_mobility.iter().map(|r| r.country.clone()).collect();
    fig.add_trace(
        Trace::bar(
            "Social Mobility",
            mobility_labels.clone(),
            by_mobility.iter().map(|r| r.social_mobility_index).collect::<Vec<_>>(),
        )
        .marker(json!({"color": PolicyTheme::highlight(&mobility_labels, intl_color)}))
        .showlegend(false)
        .hovertemplate("<b>%{x}</b><br>Mobility Index: %{y:.1f}<extra></extra>")
        .in_cell(&grid.cell(2, 1)),
    );

    let metrics = vec![
        "Education Spending<br>(% GDP)",
        "Child Poverty<br>Rate (%)",
        "PISA Math<br>Score",
        "Social Mobility<br>Index",
    ];
    let column_mean = |f: fn(&crate::domain::InternationalRecord) -> f64| {
        mean(&intl.iter().map(f).collect::<Vec<_>>()).unwrap_or(f64::NAN)
    };
    let averages = vec![
        column_mean(|r| r.education_spending_gdp),
        column_mean(|r| r.child_poverty_rate),
        column_mean(|r| r.pisa_math_score),
        column_mean(|r| r.social_mobility_index),
    ];
    let c = grid.cell(2, 2);
    fig.add_trace(
        Trace::bar(
            "Massachusetts",
            metrics.clone(),
            vec![
                ma.education_spending_gdp,
                ma.child_poverty_rate,
                ma.pisa_math_score,
                ma.social_mobility_index,
            ],
        )
        .marker(json!({"color": PolicyTheme::color("massachusetts")}))
        .showlegend(true)
        .in_cell(&c),
    );
    fig.add_trace(
        Trace::bar("International Average", metrics, averages)
            .marker(json!({"color": intl_color}))
            .showlegend(true)
            .in_cell(&c),
    );

    Ok(finish(
        fig,
        "Global Human Capital Investment Benchmarks: Strategic Policy Performance",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::build_catalog;
    use chrono::Local;

    fn catalog() -> DataCatalog {
        build_catalog(Local::now())
    }

    #[test]
    fn education_dashboard_has_four_panels() {
        let fig = education_impact_dashboard(&catalog()).unwrap();
        assert_eq!(fig.data.len(), 5);
        assert_eq!(fig.data[4].xaxis.as_deref(), Some("x4"));
        assert_eq!(fig.layout["annotations"].as_array().unwrap().len(), 4);
        assert_eq!(fig.layout["width"], 1200);
        let v = fig.to_value().unwrap();
        // Mobility panel is sorted ascending.
        let ys = v["data"][2]["y"].as_array().unwrap();
        assert!(ys.windows(2).all(|w| w[0].as_f64() <= w[1].as_f64()));
    }

    #[test]
    fn education_dashboard_requires_mobility() {
        let mut c = catalog();
        c.mobility.clear();
        assert_eq!(education_impact_dashboard(&c).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn correlation_panel_skipped_for_small_join() {
        let mut c = catalog();
        c.mobility.truncate(3);
        let fig = education_impact_dashboard(&c).unwrap();
        assert_eq!(fig.data.len(), 4);
    }

    #[test]
    fn policy_scores_follow_formula() {
        let rows = comparison_rows(&catalog());
        assert_eq!(rows.len(), 5);
        let scores = policy_scores(&rows);
        let ma = scores.iter().find(|(s, _)| s == "MA").unwrap().1;
        // MA has the max math and mobility, 1.8% uninsured, universal meals.
        let expected = (0.3 + 0.3 + (100.0 - 1.8) / 100.0 * 0.2 + 0.2) * 100.0;
        assert!((ma - expected).abs() < 1e-9, "{ma} vs {expected}");
        assert!(scores.iter().all(|(_, s)| *s <= ma + 1e-9));
    }

    #[test]
    fn rows_without_health_get_no_score() {
        let mut c = catalog();
        c.health.retain(|h| h.state != "TX");
        let rows = comparison_rows(&c);
        let tx = rows.iter().find(|r| r.state == "TX").unwrap();
        assert!(tx.math.is_some() && tx.mobility.is_some() && tx.uninsured.is_none());

        let scores = policy_scores(&rows);
        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|(s, _)| s != "TX"));
        // The maxima still include TX, so the other scores are unchanged.
        let full = policy_scores(&comparison_rows(&catalog()));
        for (state, score) in &scores {
            let before = full.iter().find(|(s, _)| s == state).unwrap().1;
            assert!((score - before).abs() < 1e-9, "{state}");
        }
    }

    #[test]
    fn policy_dashboard_splits_universal_states() {
        let fig = policy_comparison_dashboard(&catalog()).unwrap();
        let v = fig.to_value().unwrap();
        let points = |name: &str| {
            let trace = v["data"].as_array().unwrap().iter().find(|t| t["name"] == name).unwrap();
            trace["x"].as_array().unwrap().len()
        };
        assert_eq!(points("Universal Meal States") + points("Non-Universal States"), 5);
    }

    #[test]
    fn policy_dashboard_without_data_fails() {
        let err = policy_comparison_dashboard(&DataCatalog::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn international_dashboard_sorts_rankings() {
        let fig = international_comparison_dashboard(&catalog()).unwrap();
        assert_eq!(fig.data.len(), 5);
        let v = fig.to_value().unwrap();
        let pisa = v["data"][1]["y"].as_array().unwrap();
        assert!(pisa.windows(2).all(|w| w[0].as_f64() <= w[1].as_f64()));
        let mobility = v["data"][2]["y"].as_array().unwrap();
        assert!(mobility.windows(2).all(|w| w[0].as_f64() >= w[1].as_f64()));
    }
}

//! Three-dimensional views: policy space, animated trajectories and the ROI surface.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde_json::{Value, json};

use crate::chart::{Figure, Frame, PolicyTheme, Trace};
use crate::domain::{ALL_STATES, BENCHMARK_STATE, DataCatalog};
use crate::error::AppError;
use crate::io::html::{Panel, render_multi_chart_page};
use crate::math::stats::linspace;

/// States tracked in the trajectory animation and the surface overlay.
pub const KEY_STATES: [&str; 5] = ["MA", "TX", "CA", "NY", "FL"];

pub const FIRST_YEAR: i32 = 2004;
pub const LAST_YEAR: i32 = 2024;

const TRAJECTORY_NOISE_SD: f64 = 2.0;
const SURFACE_STEPS: usize = 20;

/// Optimal policy zone markers (education, health, economic outcomes).
const OPTIMAL_ZONE: [[f64; 5]; 3] = [
    [295.0, 290.0, 285.0, 300.0, 292.0],
    [90.0, 95.0, 88.0, 92.0, 91.0],
    [75.0, 80.0, 73.0, 78.0, 76.0],
];

/// One state positioned in the policy space.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyPoint {
    pub state: String,
    pub education_score: f64,
    pub health_access: f64,
    pub economic_outcomes: f64,
    pub policy_innovation: f64,
    pub human_capital_roi: f64,
}

/// Positions for every state; missing tables fall back to neutral values
/// (education 265, health 75, outcomes 50, innovation 40).
pub fn policy_space_points(catalog: &DataCatalog) -> Vec<PolicyPoint> {
    ALL_STATES
        .iter()
        .map(|&state| {
            let education_score = catalog
                .education_for(state)
                .map(|r| r.math_8th_grade * 0.5 + r.reading_8th_grade * 0.5)
                .unwrap_or(265.0);
            let health_access = catalog
                .health_for(state)
                .map(|r| 100.0 - r.uninsured_children_pct * 2.0 + (10.0 - r.child_mortality_rate) * 8.0)
                .unwrap_or(75.0);
            let economic_outcomes = catalog
                .mobility_for(state)
                .map(|r| r.mobility_index * 10.0)
                .unwrap_or(50.0);
            let policy_innovation = catalog
                .nutrition_for(state)
                .map(|r| {
                    let universal = if r.universal_meals { 1.0 } else { 0.0 };
                    universal * 30.0
                        + r.school_breakfast_participation * 0.3
                        + education_score / 300.0 * 20.0
                        + health_access / 100.0 * 20.0
                })
                .unwrap_or(40.0);

            let mut point = PolicyPoint {
                state: state.to_string(),
                education_score,
                health_access,
                economic_outcomes,
                policy_innovation,
                human_capital_roi: 0.0,
            };
            point.human_capital_roi = policy_space_roi(&point);
            point
        })
        .collect()
}

/// Illustrative ROI multiplier for the policy space, clamped to `[2, 6]`.
pub fn policy_space_roi(p: &PolicyPoint) -> f64 {
    let roi = 3.5
        + (p.education_score - 265.0) / 30.0 * 0.8
        + (p.health_access - 75.0) / 25.0 * 0.6
        + (p.economic_outcomes - 50.0) / 25.0 * 0.4
        + (p.policy_innovation - 40.0) / 60.0 * 0.5;
    roi.clamp(2.0, 6.0)
}

fn axis_3d(title: &str) -> Value {
    json!({
        "title": {"text": format!("<b>{title}</b>"), "font": {"size": 14}},
        "showgrid": true,
        "gridcolor": "lightgray",
        "showbackground": true,
        "backgroundcolor": "rgba(240,240,240,0.1)"
    })
}

fn title_block(text: &str, size: u32) -> Value {
    json!({"text": format!("<b>{text}</b>"), "x": 0.5, "font": {"size": size, "color": PolicyTheme::TITLE_COLOR}})
}

pub fn policy_space_explorer(catalog: &DataCatalog) -> Result<Figure, AppError> {
    let points = policy_space_points(catalog);
    let ma = points
        .iter()
        .find(|p| p.state == BENCHMARK_STATE)
        .ok_or_else(|| AppError::data("Policy space has no Massachusetts point."))?;

    let mut fig = Figure::new();
    let states: Vec<&str> = points.iter().map(|p| p.state.as_str()).collect();
    fig.add_trace(
        Trace::scatter3d(
            "States",
            points.iter().map(|p| p.education_score).collect(),
            points.iter().map(|p| p.health_access).collect(),
            points.iter().map(|p| p.economic_outcomes).collect(),
            "markers+text",
        )
        .marker(json!({
            "size": points.iter().map(|p| p.policy_innovation / 3.0).collect::<Vec<_>>(),
            "color": points.iter().map(|p| p.human_capital_roi).collect::<Vec<_>>(),
            "colorscale": "Viridis",
            "showscale": true,
            "colorbar": {"title": {"text": "Human Capital ROI", "side": "right"}, "tickmode": "linear", "tick0": 3, "dtick": 0.5},
            "line": PolicyTheme::white_outline(2),
            "opacity": 0.8
        }))
        .text(&states)
        .textposition("top center")
        .hovertemplate(
            "<b>%{text}</b><br>Education Score: %{x:.1f}<br>Health Access: %{y:.1f}<br>\
             Economic Outcomes: %{z:.1f}<br>Policy Innovation: %{marker.size:.1f}<br>\
             Human Capital ROI: %{marker.color:.2f}x<br><extra></extra>",
        ),
    );

    fig.add_trace(
        Trace::scatter3d(
            "Massachusetts Model",
            vec![ma.education_score],
            vec![ma.health_access],
            vec![ma.economic_outcomes],
            "markers",
        )
        .marker(json!({"size": 25, "color": "gold", "symbol": "diamond", "line": {"color": "darkgreen", "width": 3}}))
        .hovertemplate("<b>Massachusetts Model</b><br>Excellence Benchmark<extra></extra>"),
    );

    let [zx, zy, zz] = OPTIMAL_ZONE;
    fig.add_trace(
        Trace::scatter3d("Optimal Zone", zx.to_vec(), zy.to_vec(), zz.to_vec(), "markers")
            .marker(json!({"size": 8, "color": "lightgreen", "opacity": 0.4, "symbol": "circle"}))
            .hovertemplate("<b>Optimal Policy Zone</b><br>Theoretical Maximum<extra></extra>"),
    );

    fig.update_layout(json!({
        "title": title_block("3D Policy Space Explorer: Human Capital Investment Landscape", 18),
        "scene": {
            "xaxis": axis_3d("Education Performance Score"),
            "yaxis": axis_3d("Health Access Index"),
            "zaxis": axis_3d("Economic Mobility Score"),
            "camera": {"eye": {"x": 1.5, "y": 1.5, "z": 1.5}, "center": {"x": 0, "y": 0, "z": 0}},
            "aspectmode": "cube"
        },
        "width": 1000,
        "height": 700,
        "font": {"family": PolicyTheme::FONT_FAMILY, "size": 12},
        "showlegend": true,
        "legend": {"yanchor": "top", "y": 0.99, "xanchor": "left", "x": 0.01},
        "annotations": [{
            "text": "<b>Interactive 3D Policy Analysis</b><br>• Size = Policy Innovation Score<br>\
                     • Color = Human Capital ROI<br>• Position = Policy Performance<br>\
                     • Rotate, zoom, and hover for insights",
            "showarrow": false,
            "xref": "paper", "yref": "paper",
            "x": 0.02, "y": 0.85,
            "xanchor": "left", "yanchor": "top",
            "font": {"size": 11, "color": PolicyTheme::TITLE_COLOR},
            "bgcolor": "rgba(255,255,255,0.8)",
            "bordercolor": PolicyTheme::TITLE_COLOR,
            "borderwidth": 1
        }]
    }));
    Ok(fig)
}

/// Position of one state in one animation year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub year: i32,
    pub education: f64,
    pub health: f64,
    pub mobility: f64,
}

/// Simulated 2004–2024 paths for [`KEY_STATES`], indexed `[year][state]`.
///
/// Massachusetts follows a fixed upward trend. The other states follow a
/// flatter trend plus `N(0, 2)` noise drawn from `seed`.
pub fn simulate_trajectories(seed: u64) -> Result<Vec<Vec<TrajectoryPoint>>, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, TRAJECTORY_NOISE_SD)
        .map_err(|e| AppError::model(format!("Noise distribution error: {e}")))?;

    let mut years = Vec::with_capacity((LAST_YEAR - FIRST_YEAR + 1) as usize);
    for year in FIRST_YEAR..=LAST_YEAR {
        let t = (year - FIRST_YEAR) as f64;
        let row = KEY_STATES
            .iter()
            .map(|&state| {
                if state == BENCHMARK_STATE {
                    TrajectoryPoint {
                        year,
                        education: 275.0 + t * 1.0,
                        health: 80.0 + t * 0.5,
                        mobility: 65.0 + t * 0.7,
                    }
                } else {
                    TrajectoryPoint {
                        year,
                        education: 265.0 + t * 0.3 + noise.sample(&mut rng),
                        health: 70.0 + t * 0.2 + noise.sample(&mut rng),
                        mobility: 50.0 + t * 0.3 + noise.sample(&mut rng),
                    }
                }
            })
            .collect();
        years.push(row);
    }
    Ok(years)
}

fn trajectory_colors() -> [&'static str; 5] {
    [
        PolicyTheme::color("massachusetts"),
        PolicyTheme::color("poverty"),
        PolicyTheme::color("education"),
        PolicyTheme::color("health"),
        PolicyTheme::color("nutrition"),
    ]
}

fn trajectory_traces(points: &[TrajectoryPoint], first_frame: bool) -> Vec<Trace> {
    let colors = trajectory_colors();
    KEY_STATES
        .iter()
        .zip(points)
        .enumerate()
        .map(|(j, (&state, p))| {
            let size = if state == BENCHMARK_STATE { 12 } else { 10 };
            Trace::scatter3d(state, vec![p.education], vec![p.health], vec![p.mobility], "markers")
                .marker(json!({"size": size, "color": colors[j], "line": PolicyTheme::white_outline(2), "opacity": 0.8}))
                .text(&[format!("{state} ({})", p.year)])
                .showlegend(first_frame)
                .hovertemplate(format!(
                    "<b>{state} - {}</b><br>Education: %{{x:.1f}}<br>Health: %{{y:.1f}}<br>Mobility: %{{z:.1f}}<br><extra></extra>",
                    p.year
                ))
        })
        .collect()
}

/// Animated trajectories with play/pause buttons and a year slider.
///
/// The initial view shows the final year.
pub fn animated_trajectories(seed: u64) -> Result<Figure, AppError> {
    let years = simulate_trajectories(seed)?;
    let mut fig = Figure::new();

    for (i, row) in years.iter().enumerate() {
        let year = FIRST_YEAR + i as i32;
        fig.frames.push(Frame {
            name: year.to_string(),
            data: trajectory_traces(row, i == 0),
            traces: (0..KEY_STATES.len()).collect(),
        });
    }
    if let Some(last) = fig.frames.last() {
        fig.data = last.data.clone();
    }

    let steps: Vec<Value> = (FIRST_YEAR..=LAST_YEAR)
        .map(|year| {
            json!({
                "args": [[year.to_string()], {"frame": {"duration": 300, "redraw": true}, "mode": "immediate", "transition": {"duration": 300}}],
                "label": year.to_string(),
                "method": "animate"
            })
        })
        .collect();

    fig.update_layout(json!({
        "title": title_block("20-Year Policy Evolution: Human Capital Investment Trajectories (2004-2024)", 16),
        "scene": {
            "xaxis": {"title": {"text": "Education Performance"}, "range": [260, 300]},
            "yaxis": {"title": {"text": "Health Access Index"}, "range": [60, 90]},
            "zaxis": {"title": {"text": "Economic Mobility"}, "range": [40, 80]},
            "camera": {"eye": {"x": 1.3, "y": 1.3, "z": 1.3}}
        },
        "updatemenus": [{
            "type": "buttons",
            "direction": "left",
            "buttons": [
                {"args": [null, {"frame": {"duration": 500, "redraw": true}, "fromcurrent": true}], "label": "Play", "method": "animate"},
                {"args": [[null], {"frame": {"duration": 0, "redraw": true}, "mode": "immediate", "transition": {"duration": 0}}], "label": "Pause", "method": "animate"}
            ],
            "pad": {"r": 10, "t": 87},
            "showactive": false,
            "x": 0.011,
            "xanchor": "right",
            "y": 0,
            "yanchor": "top"
        }],
        "sliders": [{
            "active": steps.len().saturating_sub(1),
            "currentvalue": {"prefix": "Year: "},
            "pad": {"b": 10, "t": 60},
            "len": 0.9,
            "x": 0.1,
            "y": 0,
            "steps": steps
        }],
        "width": 1100,
        "height": 700
    }));
    Ok(fig)
}

/// ROI multiplier on the education × health plane.
pub fn surface_roi(education: f64, health: f64) -> f64 {
    let e = (education - 265.0) / 35.0 * 1.5;
    let h = (health - 75.0) / 20.0 * 1.2;
    2.5 + e + h + e * h * 0.3
}

/// Grid axes and heights; `z[j][i]` is the ROI at `(education[i], health[j])`.
pub fn surface_grid() -> (Vec<f64>, Vec<f64>, Vec<Vec<f64>>) {
    let education = linspace(250.0, 300.0, SURFACE_STEPS);
    let health = linspace(60.0, 95.0, SURFACE_STEPS);
    let z = health
        .iter()
        .map(|&h| education.iter().map(|&e| surface_roi(e, h)).collect())
        .collect();
    (education, health, z)
}

/// Overlay points for [`KEY_STATES`] with an education row.
///
/// Health is approximated as `75 + (education − 265)·0.5`.
pub fn state_surface_points(catalog: &DataCatalog) -> Vec<(String, f64, f64, f64)> {
    KEY_STATES
        .iter()
        .filter_map(|&state| {
            let r = catalog.education_for(state)?;
            let edu = (r.math_8th_grade + r.reading_8th_grade) / 2.0;
            let health = 75.0 + (edu - 265.0) * 0.5;
            let roi = 3.5 + (edu - 265.0) / 35.0 * 1.5 + (health - 75.0) / 20.0 * 1.2;
            Some((state.to_string(), edu, health, roi))
        })
        .collect()
}

pub fn impact_surface(catalog: &DataCatalog) -> Figure {
    let (education, health, z) = surface_grid();
    let mut fig = Figure::new();
    fig.add_trace(
        Trace::surface(education, health, z)
            .colorscale("Viridis")
            .showscale(true)
            .colorbar(json!({"title": {"text": "ROI Multiplier", "side": "right"}}))
            .hovertemplate("Education Score: %{x:.1f}<br>Health Index: %{y:.1f}<br>ROI: %{z:.2f}x<br><extra></extra>"),
    );

    let points = state_surface_points(catalog);
    if !points.is_empty() {
        let labels: Vec<&str> = points.iter().map(|p| p.0.as_str()).collect();
        fig.add_trace(
            Trace::scatter3d(
                "Actual States",
                points.iter().map(|p| p.1).collect(),
                points.iter().map(|p| p.2).collect(),
                points.iter().map(|p| p.3).collect(),
                "markers+text",
            )
            .marker(json!({"size": 8, "color": "red", "line": PolicyTheme::white_outline(2)}))
            .text(&labels)
            .textposition("top center")
            .hovertemplate("<b>%{text}</b><br>Current Position<extra></extra>"),
        );
    }

    fig.update_layout(json!({
        "title": title_block("3D Policy Impact Surface: ROI Optimization Landscape", 16),
        "scene": {
            "xaxis": {"title": {"text": "Education Performance Score"}},
            "yaxis": {"title": {"text": "Health Access Index"}},
            "zaxis": {"title": {"text": "Human Capital ROI"}},
            "camera": {"eye": {"x": 1.2, "y": 1.2, "z": 1.2}}
        },
        "width": 900,
        "height": 600,
        "annotations": [{
            "text": "<b>Peak Performance Zone</b><br>Higher education + health scores<br>create exponential ROI gains",
            "showarrow": true,
            "arrowhead": 2,
            "arrowsize": 1,
            "arrowcolor": "red",
            "ax": 0.7,
            "ay": 0.8,
            "x": 0.85,
            "y": 0.85,
            "xref": "paper",
            "yref": "paper",
            "font": {"size": 12, "color": PolicyTheme::TITLE_COLOR},
            "bgcolor": "rgba(255,255,255,0.8)",
            "bordercolor": "red",
            "borderwidth": 1
        }]
    }));
    fig
}

/// All three 3D figures on one navigable page.
pub fn render_3d_dashboard(catalog: &DataCatalog, seed: u64) -> Result<String, AppError> {
    let space = policy_space_explorer(catalog)?;
    let animated = animated_trajectories(seed)?;
    let surface = impact_surface(catalog);

    let panels = [
        Panel {
            anchor: "policy-space",
            chart_id: "policy-space-chart",
            nav_label: "3D Policy Space",
            title: "Interactive 3D Policy Space Explorer",
            height_px: 700,
            caption: "Rotate, zoom, and hover to explore the 3D policy landscape. Massachusetts (gold diamond) \
                      represents the excellence benchmark in the optimal performance zone.",
            plot_config: "modeBarButtonsToRemove: ['pan2d', 'lasso2d']",
            figure: &space,
        },
        Panel {
            anchor: "time-series",
            chart_id: "animated-chart",
            nav_label: "Animated Timeline",
            title: "20-Year Policy Evolution Animation",
            height_px: 700,
            caption: "Watch how different states evolved their human capital investments from 2004-2024. \
                      Use play/pause controls and year slider to explore policy trajectories.",
            plot_config: "",
            figure: &animated,
        },
        Panel {
            anchor: "surface",
            chart_id: "surface-chart",
            nav_label: "Impact Surface",
            title: "3D Policy Impact Surface",
            height_px: 600,
            caption: "3D surface reveals the ROI optimization landscape. Peak performance zones show where \
                      combined education and health investments create exponential returns.",
            plot_config: "",
            figure: &surface,
        },
    ];

    render_multi_chart_page(
        "3D Human Capital Investment Analysis",
        "Interactive 3D Exploration of Policy Performance Landscapes",
        "Explore multi-dimensional policy spaces, identify optimization opportunities, \
         and follow 20-year trajectories with interactive controls.",
        &panels,
    )
}

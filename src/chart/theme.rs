//! Policy dashboard styling: palette, title/legend layout and axis grid.

use serde_json::{Value, json};

use crate::chart::subplots::merge_value;
use crate::domain::{BENCHMARK_COUNTRY, BENCHMARK_STATE};

pub struct PolicyTheme;

impl PolicyTheme {
    pub const FONT_FAMILY: &'static str = "Arial, sans-serif";
    pub const TITLE_COLOR: &'static str = "#2C3E50";
    pub const TEXT_COLOR: &'static str = "#34495E";
    pub const GRID_COLOR: &'static str = "rgba(128,128,128,0.2)";
    pub const AXIS_LINE_COLOR: &'static str = "#BDC3C7";

    /// Named series colors.
    pub const COLORS: [(&'static str, &'static str); 9] = [
        ("education", "#2E86AB"),
        ("health", "#A23B72"),
        ("nutrition", "#F18F01"),
        ("poverty", "#C73E1D"),
        ("success", "#588B8B"),
        ("neutral", "#8D8D8D"),
        ("massachusetts", "#004225"),
        ("national", "#CC0000"),
        ("international", "#1f77b4"),
    ];

    /// Fallback series colors, persisted with the viz config.
    pub const EXTENDED_PALETTE: [&'static str; 15] = [
        "#2E86AB", "#A23B72", "#F18F01", "#588B8B", "#C73E1D", "#8D8D8D", "#004225", "#CC0000",
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
    ];

    /// Color for a named role; unknown names fall back to `neutral`.
    pub fn color(name: &str) -> &'static str {
        Self::COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
            .unwrap_or("#8D8D8D")
    }

    /// Benchmark color for Massachusetts, `other` for everyone else.
    pub fn highlight<S: AsRef<str>>(labels: &[S], other: &str) -> Vec<String> {
        labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                if l == BENCHMARK_STATE || l == BENCHMARK_COUNTRY {
                    Self::color("massachusetts").to_string()
                } else {
                    other.to_string()
                }
            })
            .collect()
    }

    /// General single-chart layout.
    pub fn get_layout(title: &str, width: u32, height: u32, font_size: u32, show_legend: bool) -> Value {
        json!({
            "title": {
                "text": format!("<b>{title}</b>"),
                "x": 0.5,
                "xanchor": "center",
                "font": {"size": font_size + 4, "family": Self::FONT_FAMILY, "color": Self::TITLE_COLOR}
            },
            "width": width,
            "height": height,
            "font": {"family": Self::FONT_FAMILY, "size": font_size, "color": Self::TEXT_COLOR},
            "plot_bgcolor": "rgba(0,0,0,0)",
            "paper_bgcolor": "white",
            "showlegend": show_legend,
            "legend": {
                "orientation": "h",
                "yanchor": "top",
                "y": -0.1,
                "xanchor": "center",
                "x": 0.5,
                "font": {"size": font_size.saturating_sub(1)}
            },
            "margin": {"l": 80, "r": 80, "t": 100, "b": 80},
            "hovermode": "closest"
        })
    }

    /// Layout shared by the 2×2 dashboards: the general layout with a larger
    /// title and the legend pulled closer to the grid.
    pub fn dashboard_layout(title: &str, width: u32, height: u32) -> Value {
        let mut layout = Self::get_layout(title, width, height, 12, true);
        merge_value(
            &mut layout,
            &json!({
                "title": {"font": {"size": 18}},
                "legend": {"y": -0.05}
            }),
        );
        layout
    }

    /// Grid styling applied to every 2D axis of a dashboard.
    pub fn axis_grid() -> Value {
        json!({"showgrid": true, "gridcolor": Self::GRID_COLOR})
    }

    /// Full axis styling with a bold title.
    pub fn styled_axis(title: &str) -> Value {
        json!({
            "title": {"text": format!("<b>{title}</b>")},
            "showgrid": true,
            "gridwidth": 1,
            "gridcolor": Self::GRID_COLOR,
            "showline": true,
            "linewidth": 1,
            "linecolor": Self::AXIS_LINE_COLOR,
            "tickfont": {"size": 11}
        })
    }

    /// Marker outline used on bars and scatter points.
    pub fn white_outline(width: u32) -> Value {
        json!({"color": "white", "width": width})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors() {
        assert_eq!(PolicyTheme::color("education"), "#2E86AB");
        assert_eq!(PolicyTheme::color("massachusetts"), "#004225");
        assert_eq!(PolicyTheme::color("nope"), "#8D8D8D");
    }

    #[test]
    fn highlight_marks_benchmark() {
        let colors = PolicyTheme::highlight(&["TX", "MA", "Massachusetts"], "#fff");
        assert_eq!(colors, vec!["#fff", "#004225", "#004225"]);
    }

    #[test]
    fn dashboard_layout_shape() {
        let layout = PolicyTheme::dashboard_layout("T", 1200, 800);
        assert_eq!(layout["title"]["text"], "<b>T</b>");
        assert_eq!(layout["title"]["font"]["size"], 18);
        assert_eq!(layout["legend"]["y"], -0.05);
        assert_eq!(layout["width"], 1200);
        assert_eq!(layout["title"]["font"]["family"], PolicyTheme::FONT_FAMILY);
        assert_eq!(layout["legend"]["orientation"], "h");
        let general = PolicyTheme::get_layout("G", 1000, 600, 12, true);
        assert_eq!(general["title"]["font"]["size"], 16);
        assert_eq!(general["legend"]["font"]["size"], 11);
    }
}

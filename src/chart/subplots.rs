//! Subplot grid layout for multi-panel dashboards.
//!
//! Cells are addressed 1-based as `(row, col)` with row 1 at the top. Cell
//! `k = (row - 1) * cols + col` uses axes `x{k}`/`y{k}` (the first is plain
//! `x`/`y`). Subplot titles become paper-anchored annotations above each cell.

use serde_json::{Map, Value, json};

use crate::chart::Figure;
use crate::chart::theme::PolicyTheme;

/// Axis references for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub x_ref: String,
    pub y_ref: String,
    /// Layout keys (`xaxis2`, `yaxis2`).
    pub x_key: String,
    pub y_key: String,
}

#[derive(Debug, Clone)]
pub struct SubplotGrid {
    pub rows: usize,
    pub cols: usize,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub titles: Vec<String>,
}

impl SubplotGrid {
    /// Grid with the default spacing (`0.2 / cols` across, `0.3 / rows` down).
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            horizontal_spacing: 0.2 / cols as f64,
            vertical_spacing: 0.3 / rows as f64,
            titles: Vec::new(),
        }
    }

    pub fn spacing(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_spacing = horizontal;
        self.vertical_spacing = vertical;
        self
    }

    /// Titles in row-major order.
    pub fn titles(mut self, titles: &[&str]) -> Self {
        self.titles = titles.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        let k = self.index(row, col);
        let suffix = if k == 1 { String::new() } else { k.to_string() };
        Cell {
            x_ref: format!("x{suffix}"),
            y_ref: format!("y{suffix}"),
            x_key: format!("xaxis{suffix}"),
            y_key: format!("yaxis{suffix}"),
        }
    }

    pub fn x_domain(&self, col: usize) -> [f64; 2] {
        let width = (1.0 - self.horizontal_spacing * (self.cols - 1) as f64) / self.cols as f64;
        let start = (col.clamp(1, self.cols) - 1) as f64 * (width + self.horizontal_spacing);
        [start, start + width]
    }

    pub fn y_domain(&self, row: usize) -> [f64; 2] {
        let height = (1.0 - self.vertical_spacing * (self.rows - 1) as f64) / self.rows as f64;
        let top = 1.0 - (row.clamp(1, self.rows) - 1) as f64 * (height + self.vertical_spacing);
        [top - height, top]
    }

    /// Axis domains, grid styling and title annotations.
    pub fn layout(&self) -> Map<String, Value> {
        let mut layout = Map::new();
        let mut annotations = Vec::new();

        for row in 1..=self.rows {
            for col in 1..=self.cols {
                let cell = self.cell(row, col);
                let x_domain = self.x_domain(col);
                let y_domain = self.y_domain(row);

                let mut x_axis = json!({"domain": x_domain, "anchor": cell.y_ref});
                let mut y_axis = json!({"domain": y_domain, "anchor": cell.x_ref});
                merge_value(&mut x_axis, &PolicyTheme::axis_grid());
                merge_value(&mut y_axis, &PolicyTheme::axis_grid());
                layout.insert(cell.x_key, x_axis);
                layout.insert(cell.y_key, y_axis);

                if let Some(title) = self.titles.get(self.index(row, col) - 1) {
                    annotations.push(json!({
                        "text": title,
                        "x": (x_domain[0] + x_domain[1]) / 2.0,
                        "y": y_domain[1],
                        "xref": "paper",
                        "yref": "paper",
                        "xanchor": "center",
                        "yanchor": "bottom",
                        "showarrow": false,
                        "font": {"size": 16}
                    }));
                }
            }
        }

        layout.insert("annotations".to_string(), Value::Array(annotations));
        layout
    }

    /// Empty figure carrying this grid's layout.
    /// Layout patch giving cell `(row, col)` styled axes with bold titles.
    pub fn axis_titles(&self, row: usize, col: usize, x_title: &str, y_title: &str) -> Value {
        let cell = self.cell(row, col);
        let mut patch = Map::new();
        patch.insert(cell.x_key, PolicyTheme::styled_axis(x_title));
        patch.insert(cell.y_key, PolicyTheme::styled_axis(y_title));
        Value::Object(patch)
    }

    pub fn figure(&self) -> Figure {
        Figure {
            layout: self.layout(),
            ..Figure::default()
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        (row.clamp(1, self.rows) - 1) * self.cols + col.clamp(1, self.cols)
    }
}

/// Recursive object merge; non-object values in `patch` replace `base`.
pub fn merge_value(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(b), Value::Object(p)) => {
            for (k, v) in p {
                match b.get_mut(k) {
                    Some(existing) => merge_value(existing, v),
                    None => {
                        b.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (b, p) => *b = p.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-12 && (a[1] - b[1]).abs() < 1e-12
    }

    #[test]
    fn axis_names_follow_row_major_order() {
        let grid = SubplotGrid::new(2, 2);
        assert_eq!(grid.cell(1, 1).x_ref, "x");
        assert_eq!(grid.cell(1, 1).x_key, "xaxis");
        assert_eq!(grid.cell(1, 2).x_ref, "x2");
        assert_eq!(grid.cell(2, 1).y_ref, "y3");
        assert_eq!(grid.cell(2, 2).y_key, "yaxis4");
    }

    #[test]
    fn domains_with_custom_spacing() {
        let grid = SubplotGrid::new(2, 2).spacing(0.1, 0.12);
        assert!(close(grid.x_domain(1), [0.0, 0.45]));
        assert!(close(grid.x_domain(2), [0.55, 1.0]));
        assert!(close(grid.y_domain(1), [0.56, 1.0]));
        assert!(close(grid.y_domain(2), [0.0, 0.44]));
    }

    #[test]
    fn default_spacing_matches_make_subplots() {
        let grid = SubplotGrid::new(2, 2);
        assert!((grid.horizontal_spacing - 0.1).abs() < 1e-12);
        assert!((grid.vertical_spacing - 0.15).abs() < 1e-12);
    }

    #[test]
    fn titles_become_annotations() {
        let grid = SubplotGrid::new(1, 2).titles(&["Left", "Right"]);
        let layout = grid.layout();
        let ann = layout["annotations"].as_array().unwrap();
        assert_eq!(ann.len(), 2);
        assert_eq!(ann[1]["text"], "Right");
        assert_eq!(ann[0]["y"], 1.0);
        assert_eq!(layout["xaxis2"]["anchor"], "y2");
        assert_eq!(layout["yaxis"]["gridcolor"], PolicyTheme::GRID_COLOR);
    }

    #[test]
    fn axis_titles_keep_domains() {
        let grid = SubplotGrid::new(2, 2);
        let mut fig = grid.figure();
        fig.update_layout(grid.axis_titles(2, 2, "Innovation", "ROI"));
        assert_eq!(fig.layout["xaxis4"]["title"]["text"], "<b>Innovation</b>");
        assert_eq!(fig.layout["yaxis4"]["title"]["text"], "<b>ROI</b>");
        assert_eq!(fig.layout["xaxis4"]["linecolor"], PolicyTheme::AXIS_LINE_COLOR);
        assert_eq!(fig.layout["xaxis4"]["anchor"], "y4");
        assert!(fig.layout["xaxis4"]["domain"].is_array());
    }

    #[test]
    fn merge_is_recursive() {
        let mut base = json!({"a": {"b": 1, "c": 2}, "d": 3});
        merge_value(&mut base, &json!({"a": {"b": 9}, "e": 4}));
        assert_eq!(base, json!({"a": {"b": 9, "c": 2}, "d": 3, "e": 4}));
    }
}

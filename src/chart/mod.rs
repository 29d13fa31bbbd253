//! Plotly figure model.
//!
//! A [`Figure`] serializes to the `{data, layout, frames}` object that
//! `Plotly.newPlot` consumes.

pub mod subplots;
pub mod theme;
pub mod trace;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

pub use subplots::{Cell, SubplotGrid, merge_value};
pub use theme::PolicyTheme;
pub use trace::{Trace, TraceKind, Values};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

/// One animation step: replaces the traces at indices `traces`.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub name: String,
    pub data: Vec<Trace>,
    pub traces: Vec<usize>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    /// Deep-merge `patch` (a JSON object) into the layout.
    pub fn update_layout(&mut self, patch: Value) {
        let mut current = Value::Object(std::mem::take(&mut self.layout));
        merge_value(&mut current, &patch);
        if let Value::Object(map) = current {
            self.layout = map;
        }
    }

    /// Apply `patch` to every 2D axis already present in the layout.
    pub fn update_axes(&mut self, patch: &Value) {
        for (key, axis) in self.layout.iter_mut() {
            if key.starts_with("xaxis") || key.starts_with("yaxis") {
                merge_value(axis, patch);
            }
        }
    }

    pub fn to_value(&self) -> Result<Value, AppError> {
        serde_json::to_value(self).map_err(|e| AppError::io(format!("Failed to serialize figure: {e}")))
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError::io(format!("Failed to serialize figure: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frames_are_omitted_when_empty() {
        let mut fig = Figure::new();
        fig.add_trace(Trace::bar("A", vec!["x"], vec![1.0]));
        let v = fig.to_value().unwrap();
        assert!(v.get("frames").is_none());
        assert_eq!(v["data"][0]["type"], "bar");
    }

    #[test]
    fn update_layout_merges_nested_keys() {
        let mut fig = SubplotGrid::new(1, 1).figure();
        fig.update_layout(json!({"title": {"text": "T"}, "xaxis": {"range": [0, 1]}}));
        assert_eq!(fig.layout["title"]["text"], "T");
        assert_eq!(fig.layout["xaxis"]["anchor"], "y");
        assert_eq!(fig.layout["xaxis"]["range"], json!([0, 1]));
    }

    #[test]
    fn update_axes_touches_only_axes() {
        let mut fig = SubplotGrid::new(1, 2).figure();
        fig.update_axes(&json!({"zeroline": false}));
        assert_eq!(fig.layout["yaxis2"]["zeroline"], false);
        assert!(fig.layout["annotations"].get("zeroline").is_none());
    }

    #[test]
    fn frames_serialize() {
        let mut fig = Figure::new();
        fig.frames.push(Frame {
            name: "2004".into(),
            data: vec![Trace::scatter3d("MA", vec![1.0], vec![2.0], vec![3.0], "markers")],
            traces: vec![0],
        });
        let v = fig.to_value().unwrap();
        assert_eq!(v["frames"][0]["name"], "2004");
        assert_eq!(v["frames"][0]["traces"], json!([0]));
    }
}

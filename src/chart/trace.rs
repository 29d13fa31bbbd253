//! Plotly trace records.
//!
//! Only the attributes the dashboards set are modelled; `None` fields are
//! omitted from the JSON so Plotly applies its own defaults.

use serde::Serialize;
use serde_json::Value;

use crate::chart::subplots::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Bar,
    Scatter,
    Scatter3d,
    Heatmap,
    Surface,
}

/// Coordinate array: numbers, category labels, or a 2D grid (heatmap/surface `z`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Numbers(Vec<f64>),
    Labels(Vec<String>),
    Grid(Vec<Vec<f64>>),
}

impl From<Vec<f64>> for Values {
    fn from(v: Vec<f64>) -> Self {
        Values::Numbers(v)
    }
}

impl From<Vec<String>> for Values {
    fn from(v: Vec<String>) -> Self {
        Values::Labels(v)
    }
}

impl From<Vec<&str>> for Values {
    fn from(v: Vec<&str>) -> Self {
        Values::Labels(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Vec<f64>>> for Values {
    fn from(v: Vec<Vec<f64>>) -> Self {
        Values::Grid(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

impl Trace {
    pub fn new(kind: TraceKind) -> Self {
        Self {
            kind,
            name: None,
            x: None,
            y: None,
            z: None,
            mode: None,
            text: None,
            textposition: None,
            hovertemplate: None,
            marker: None,
            line: None,
            colorscale: None,
            showscale: None,
            colorbar: None,
            showlegend: None,
            xaxis: None,
            yaxis: None,
        }
    }

    pub fn bar(name: &str, x: impl Into<Values>, y: impl Into<Values>) -> Self {
        let mut t = Self::new(TraceKind::Bar);
        t.name = Some(name.to_string());
        t.x = Some(x.into());
        t.y = Some(y.into());
        t
    }

    pub fn scatter(name: &str, x: impl Into<Values>, y: impl Into<Values>, mode: &str) -> Self {
        let mut t = Self::new(TraceKind::Scatter);
        t.name = Some(name.to_string());
        t.x = Some(x.into());
        t.y = Some(y.into());
        t.mode = Some(mode.to_string());
        t
    }

    pub fn scatter3d(name: &str, x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, mode: &str) -> Self {
        let mut t = Self::new(TraceKind::Scatter3d);
        t.name = Some(name.to_string());
        t.x = Some(x.into());
        t.y = Some(y.into());
        t.z = Some(z.into());
        t.mode = Some(mode.to_string());
        t
    }

    /// `z[row][col]` with `x` labelling columns and `y` labelling rows.
    pub fn heatmap(name: &str, z: Vec<Vec<f64>>, x: impl Into<Values>, y: impl Into<Values>) -> Self {
        let mut t = Self::new(TraceKind::Heatmap);
        t.name = Some(name.to_string());
        t.z = Some(z.into());
        t.x = Some(x.into());
        t.y = Some(y.into());
        t
    }

    /// `z[j][i]` is the height at `(x[i], y[j])`.
    pub fn surface(x: Vec<f64>, y: Vec<f64>, z: Vec<Vec<f64>>) -> Self {
        let mut t = Self::new(TraceKind::Surface);
        t.x = Some(x.into());
        t.y = Some(y.into());
        t.z = Some(z.into());
        t
    }

    pub fn text<S: ToString>(mut self, text: &[S]) -> Self {
        self.text = Some(text.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn textposition(mut self, position: &str) -> Self {
        self.textposition = Some(position.to_string());
        self
    }

    pub fn hovertemplate(mut self, template: impl Into<String>) -> Self {
        self.hovertemplate = Some(template.into());
        self
    }

    pub fn marker(mut self, marker: Value) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn line(mut self, line: Value) -> Self {
        self.line = Some(line);
        self
    }

    pub fn colorscale(mut self, scale: &str) -> Self {
        self.colorscale = Some(scale.to_string());
        self
    }

    pub fn showscale(mut self, show: bool) -> Self {
        self.showscale = Some(show);
        self
    }

    pub fn colorbar(mut self, colorbar: Value) -> Self {
        self.colorbar = Some(colorbar);
        self
    }

    pub fn showlegend(mut self, show: bool) -> Self {
        self.showlegend = Some(show);
        self
    }

    /// Place the trace on a subplot's axes.
    pub fn in_cell(mut self, cell: &Cell) -> Self {
        self.xaxis = Some(cell.x_ref.clone());
        self.yaxis = Some(cell.y_ref.clone());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bar_serializes_only_set_fields() {
        let t = Trace::bar("Math", vec!["MA", "TX"], vec![295.0, 275.0]).showlegend(false);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(
            v,
            json!({"type": "bar", "name": "Math", "x": ["MA", "TX"], "y": [295.0, 275.0], "showlegend": false})
        );
    }

    #[test]
    fn scatter3d_type_name() {
        let t = Trace::scatter3d("S", vec![1.0], vec![2.0], vec![3.0], "markers");
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["type"], "scatter3d");
        assert_eq!(v["z"], json!([3.0]));
    }

    #[test]
    fn surface_grid_is_nested() {
        let t = Trace::surface(vec![0.0, 1.0], vec![0.0], vec![vec![1.0, 2.0]]);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["z"], json!([[1.0, 2.0]]));
        assert!(v.get("name").is_none());
    }
}

//! Column standardization (zero mean, unit variance).

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Per-column standard scaler.
///
/// Constant columns keep a scale of 1.0 so they map to zero instead of `NaN`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &DMatrix<f64>) -> Self {
        let n = x.nrows().max(1) as f64;
        let mut means = Vec::with_capacity(x.ncols());
        let mut scales = Vec::with_capacity(x.ncols());
        for col in x.column_iter() {
            let m = col.sum() / n;
            let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let sd = var.sqrt();
            means.push(m);
            scales.push(if sd > 1e-12 { sd } else { 1.0 });
        }
        Self { means, scales }
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let mut out = x.clone();
        for (j, mut col) in out.column_iter_mut().enumerate() {
            let m = self.means.get(j).copied().unwrap_or(0.0);
            let s = self.scales.get(j).copied().unwrap_or(1.0);
            for v in col.iter_mut() {
                *v = (*v - m) / s;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_columns_and_guards_constants() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&x);
        assert!((z.column(0).sum()).abs() < 1e-12);
        let var = z.column(0).iter().map(|v| v * v).sum::<f64>() / 3.0;
        assert!((var - 1.0).abs() < 1e-12);
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }
}

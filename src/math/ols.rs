//! Least squares solvers.
//!
//! Linear models in this project are tiny (≤10 rows, ~20 columns), so the
//! systems are usually wide rather than tall. We solve them with SVD, which
//! handles rank-deficient and underdetermined design matrices (returning the
//! minimum-norm solution).
//!
//! Ridge regression is solved as an augmented ordinary least squares problem:
//!
//! ```text
//! minimize ||y - Xβ||² + α||β||²   ⇔   minimize || [y; 0] - [X; √α I] β ||²
//! ```

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve `minimize ||y - Xβ||² + α||β||²` (no intercept column).
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, alpha: f64) -> Option<DVector<f64>> {
    if alpha <= 0.0 {
        return solve_least_squares(x, y);
    }
    let (n, p) = x.shape();
    let penalty = alpha.sqrt();

    let mut augmented = DMatrix::<f64>::zeros(n + p, p);
    augmented.view_mut((0, 0), (n, p)).copy_from(x);
    for j in 0..p {
        augmented[(n + j, j)] = penalty;
    }

    let mut rhs = DVector::<f64>::zeros(n + p);
    rhs.rows_mut(0, n).copy_from(y);

    solve_least_squares(&augmented, &rhs)
}

//! CART regression tree (squared-error criterion).
//!
//! Nodes live in a flat arena so the fitted tree serializes as plain JSON.
//! Splits are axis-aligned `x[feature] <= threshold`, with the threshold at the
//! midpoint between two adjacent distinct values.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub max_depth: usize,
    nodes: Vec<Node>,
    /// Raw (unnormalized) impurity decrease per feature.
    impurity_decrease: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            nodes: Vec::new(),
            impurity_decrease: Vec::new(),
        }
    }

    /// Fit on the given rows of `x`. Rows may repeat (bootstrap samples).
    pub fn fit_rows(&mut self, x: &DMatrix<f64>, y: &[f64], rows: &[usize]) {
        self.nodes.clear();
        self.impurity_decrease = vec![0.0; x.ncols()];
        if rows.is_empty() {
            self.nodes.push(Node::Leaf { value: 0.0 });
            return;
        }
        let mut rows = rows.to_vec();
        self.build(x, y, &mut rows, 0);
    }

    pub fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) {
        let rows: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &rows);
    }

    pub fn predict_row(&self, x: &DMatrix<f64>, row: usize) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if x[(row, *feature)] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => return 0.0,
            }
        }
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        (0..x.nrows()).map(|i| self.predict_row(x, i)).collect()
    }

    /// Impurity-based importances normalized to sum to 1 (all zeros for a stump).
    pub fn feature_importance(&self) -> Vec<f64> {
        let total: f64 = self.impurity_decrease.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.impurity_decrease.len()];
        }
        self.impurity_decrease.iter().map(|v| v / total).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    fn build(&mut self, x: &DMatrix<f64>, y: &[f64], rows: &mut [usize], depth: usize) -> usize {
        let idx = self.nodes.len();
        let value = mean_of(y, rows);
        self.nodes.push(Node::Leaf { value });

        if depth >= self.max_depth || rows.len() < 2 {
            return idx;
        }
        let Some(split) = best_split(x, y, rows) else {
            return idx;
        };

        self.impurity_decrease[split.feature] += split.gain;

        rows.sort_by(|&a, &b| x[(a, split.feature)].total_cmp(&x[(b, split.feature)]));
        let cut = rows.partition_point(|&r| x[(r, split.feature)] <= split.threshold);
        let (left_rows, right_rows) = rows.split_at_mut(cut);

        let left = self.build(x, y, left_rows, depth + 1);
        let right = self.build(x, y, right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }
}

fn mean_of(y: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64
}

/// Exhaustive search over features and cut points.
///
/// Ties keep the lowest feature index and the lowest threshold.
fn best_split(x: &DMatrix<f64>, y: &[f64], rows: &[usize]) -> Option<BestSplit> {
    let n = rows.len();
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;
    if parent_sse <= 1e-12 {
        return None;
    }

    let mut best: Option<BestSplit> = None;
    let mut order = rows.to_vec();

    for feature in 0..x.ncols() {
        order.sort_by(|&a, &b| x[(a, feature)].total_cmp(&x[(b, feature)]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..n - 1 {
            let yi = y[order[i]];
            left_sum += yi;
            left_sq += yi * yi;

            let here = x[(order[i], feature)];
            let next = x[(order[i + 1], feature)];
            if next <= here {
                continue;
            }

            let nl = (i + 1) as f64;
            let nr = (n - i - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
            let gain = parent_sse - sse;

            if gain > 1e-12 && best.as_ref().is_none_or(|b| gain > b.gain + 1e-12) {
                best = Some(BestSplit {
                    feature,
                    threshold: (here + next) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (DMatrix<f64>, Vec<f64>) {
        // Feature 0 separates the target cleanly; feature 1 is noise.
        let x = DMatrix::from_row_slice(
            6,
            2,
            &[1.0, 5.0, 2.0, 3.0, 3.0, 4.0, 10.0, 1.0, 11.0, 6.0, 12.0, 2.0],
        );
        let y = vec![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        (x, y)
    }

    #[test]
    fn learns_a_step_function() {
        let (x, y) = step_data();
        let mut tree = RegressionTree::new(3);
        tree.fit(&x, &y);
        assert_eq!(tree.predict(&x), y);
        assert_eq!(tree.depth(), 1);
        let imp = tree.feature_importance();
        assert!((imp[0] - 1.0).abs() < 1e-12);
        assert_eq!(imp[1], 0.0);
    }

    #[test]
    fn threshold_is_midpoint() {
        let (x, y) = step_data();
        let mut tree = RegressionTree::new(1);
        tree.fit(&x, &y);
        let queries = DMatrix::from_row_slice(2, 2, &[6.4, 0.0, 6.6, 0.0]);
        assert_eq!(tree.predict(&queries), vec![1.0, 5.0]);
    }

    #[test]
    fn depth_zero_predicts_mean() {
        let (x, y) = step_data();
        let mut tree = RegressionTree::new(0);
        tree.fit(&x, &y);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.predict(&x).iter().all(|v| (*v - 3.0).abs() < 1e-12));
        assert!(tree.feature_importance().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn respects_max_depth() {
        let x = DMatrix::from_fn(16, 1, |i, _| i as f64);
        let y: Vec<f64> = (0..16).map(|i| (i * i) as f64).collect();
        let mut tree = RegressionTree::new(3);
        tree.fit(&x, &y);
        assert!(tree.depth() <= 3);
        assert!(tree.node_count() <= 15);
    }

    #[test]
    fn bootstrap_rows_may_repeat() {
        let (x, y) = step_data();
        let mut tree = RegressionTree::new(3);
        tree.fit_rows(&x, &y, &[0, 0, 0, 5, 5]);
        assert_eq!(tree.predict_row(&x, 1), 1.0);
        assert_eq!(tree.predict_row(&x, 4), 5.0);
    }
}

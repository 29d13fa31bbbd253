//! Seeded train/test split.

use rand::prelude::*;
use rand::rngs::StdRng;

/// Held-out share of rows.
pub const TEST_SHARE: f64 = 0.3;

/// Below this many rows every row is used for both training and testing.
pub const MIN_ROWS_FOR_HOLDOUT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Split {
    /// Train and test are the same rows.
    pub fn is_in_sample(&self) -> bool {
        self.train == self.test
    }
}

/// Shuffle `0..n` with `seed` and hold out `ceil(0.3 n)` rows.
///
/// Both index lists come back sorted so downstream tables keep state order.
pub fn train_test_split(n: usize, seed: u64) -> Split {
    let all: Vec<usize> = (0..n).collect();
    if n < MIN_ROWS_FOR_HOLDOUT {
        return Split {
            train: all.clone(),
            test: all,
        };
    }

    let mut order = all;
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let n_test = (n as f64 * TEST_SHARE).ceil() as usize;
    let mut test = order[..n_test].to_vec();
    let mut train = order[n_test..].to_vec();
    test.sort_unstable();
    train.sort_unstable();
    Split { train, test }
}

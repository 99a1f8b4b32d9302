//! Train/test partitioning
//!
//! One seeded permutation drives the split of the feature matrix and both
//! target vectors, so a row keeps the same membership for the
//! classification and the regression task. Membership is a pure function of
//! the seed, the row count and the test fraction.

use crate::error::{BenchError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A train/test partition of the matrix and both targets
#[derive(Debug, Clone)]
pub struct TaskSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_class_train: Array1<f64>,
    pub y_class_test: Array1<f64>,
    pub y_reg_train: Array1<f64>,
    pub y_reg_test: Array1<f64>,
}

impl TaskSplit {
    pub fn n_train(&self) -> usize {
        self.x_train.nrows()
    }

    pub fn n_test(&self) -> usize {
        self.x_test.nrows()
    }
}

/// Shuffled row indices for a given seed and row count.
/// Exposed separately so determinism can be asserted without a matrix.
pub fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

/// Partition features and both targets with shared row membership
pub fn split_tasks(
    x: &Array2<f64>,
    y_class: &Array1<f64>,
    y_reg: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<TaskSplit> {
    let n = x.nrows();
    if y_class.len() != n || y_reg.len() != n {
        return Err(BenchError::Shape {
            expected: format!("targets of length {}", n),
            actual: format!("{} / {}", y_class.len(), y_reg.len()),
        });
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(BenchError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(BenchError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: format!("leaves no usable partition for {} rows", n),
        });
    }

    let indices = shuffled_indices(n, seed);
    let (test_idx, train_idx) = indices.split_at(n_test);

    let take_rows = |idx: &[usize]| x.select(Axis(0), idx);
    let take_vals = |v: &Array1<f64>, idx: &[usize]| -> Array1<f64> {
        idx.iter().map(|&i| v[i]).collect()
    };

    Ok(TaskSplit {
        x_train: take_rows(train_idx),
        x_test: take_rows(test_idx),
        y_class_train: take_vals(y_class, train_idx),
        y_class_test: take_vals(y_class, test_idx),
        y_reg_train: take_vals(y_reg, train_idx),
        y_reg_test: take_vals(y_reg, test_idx),
    })
}

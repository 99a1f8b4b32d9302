//! Bootstrap random forests over the CART core
//!
//! Trees are trained on bootstrap resamples with a per-tree column subset.
//! Per-tree seeds derive from the forest seed, so the ensemble is fully
//! reproducible while trees stay decorrelated.

use crate::error::{BenchError, Result};
use crate::models::decision_tree::Cart;
use crate::models::{check_fit_shapes, Classifier, Regressor};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
struct Forest {
    trees: Vec<(Cart, Vec<usize>)>,
    n_estimators: usize,
    max_depth: Option<usize>,
    seed: u64,
    classification: bool,
}

impl Forest {
    fn new(n_estimators: usize, seed: u64, classification: bool) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            seed,
            classification,
        }
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_cols = ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features);

        let trees: Result<Vec<(Cart, Vec<usize>)>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(t as u64));

                let sample_idx: Vec<usize> = (0..n_samples)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();
                let mut col_idx: Vec<usize> = (0..n_features).collect();
                col_idx.shuffle(&mut rng);
                col_idx.truncate(n_cols);
                col_idx.sort_unstable();

                let x_boot = x.select(Axis(0), &sample_idx).select(Axis(1), &col_idx);
                let y_boot: Array1<f64> = sample_idx.iter().map(|&i| y[i]).collect();

                let mut tree = if self.classification {
                    Cart::classifier()
                } else {
                    Cart::regressor()
                };
                if let Some(depth) = self.max_depth {
                    tree = tree.with_max_depth(depth);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok((tree, col_idx))
            })
            .collect();

        self.trees = trees?;
        Ok(())
    }

    /// Average of the trees' leaf means: vote fraction for classification,
    /// prediction mean for regression
    fn predict_mean(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(BenchError::NotFitted);
        }
        let mut acc = Array1::zeros(x.nrows());
        for (tree, col_idx) in &self.trees {
            let x_sub = x.select(Axis(1), col_idx);
            acc = acc + tree.predict_mean(&x_sub)?;
        }
        Ok(acc / self.trees.len() as f64)
    }
}

/// Random forest classifier (20 trees by default in the catalogue)
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    forest: Forest,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            forest: Forest::new(n_estimators, seed, true),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.forest.max_depth = Some(depth);
        self
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.forest.fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .forest
            .predict_mean(x)?
            .mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.forest.predict_mean(x))
    }
}

/// Random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    forest: Forest,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            forest: Forest::new(n_estimators, seed, false),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.forest.max_depth = Some(depth);
        self
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.forest.fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.forest.predict_mean(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn blob_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let base = if i < n / 2 { 0.0 } else { 5.0 };
            base + ((i * 7 + j * 3) % 10) as f64 * 0.1
        });
        let y: Array1<f64> = (0..n).map(|i| if i < n / 2 { 0.0 } else { 1.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_classifier_learns_blobs() {
        let (x, y) = blob_data(40);
        let mut forest = RandomForestClassifier::new(10, 42);
        forest.fit(&x, &y).unwrap();
        let pred = forest.predict(&x).unwrap();
        let correct = pred
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 0.5)
            .count();
        assert!(correct >= 36, "only {} of 40 correct", correct);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y) = blob_data(30);
        let mut a = RandomForestClassifier::new(5, 7);
        let mut b = RandomForestClassifier::new(5, 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_regressor_tracks_mean_levels() {
        let x = Array2::from_shape_fn((30, 1), |(i, _)| if i < 15 { 0.0 } else { 10.0 });
        let y: Array1<f64> = (0..30).map(|i| if i < 15 { 1.0 } else { 9.0 }).collect();
        let mut forest = RandomForestRegressor::new(10, 42);
        forest.fit(&x, &y).unwrap();
        let pred = forest.predict(&x).unwrap();
        assert!(pred[0] < 5.0);
        assert!(pred[29] > 5.0);
    }
}

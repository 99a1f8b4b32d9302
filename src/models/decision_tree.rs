//! CART decision trees
//!
//! One tree core serves both tasks: Gini impurity with majority leaves for
//! binary classification, variance reduction with mean leaves for
//! regression. The split search sorts each feature once and sweeps
//! candidate thresholds with running sums.

use crate::error::Result;
use crate::models::{check_fit_shapes, Classifier, Regressor};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Prediction: majority class or mean value
        value: f64,
        /// Mean of the leaf's labels; equals the positive fraction for
        /// binary labels and drives probability estimates
        mean: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Shared tree core
#[derive(Debug, Clone)]
pub(crate) struct Cart {
    root: Option<Node>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    classification: bool,
}

impl Cart {
    pub(crate) fn classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            classification: true,
        }
    }

    pub(crate) fn regressor() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            classification: false,
        }
    }

    pub(crate) fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub(crate) fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build(x, y, &indices, 0));
        Ok(())
    }

    pub(crate) fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_with(x, |leaf_value, _| leaf_value)
    }

    /// Leaf means instead of leaf values: positive-class fraction for
    /// classification trees
    pub(crate) fn predict_mean(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.predict_with(x, |_, leaf_mean| leaf_mean)
    }

    fn predict_with(
        &self,
        x: &Array2<f64>,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(crate::error::BenchError::NotFitted)?;
        let out: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i);
                let mut node = root;
                loop {
                    match node {
                        Node::Leaf { value, mean } => return pick(*value, *mean),
                        Node::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if row[*feature] <= *threshold { left } else { right };
                        }
                    }
                }
            })
            .collect();
        Ok(Array1::from_vec(out))
    }

    fn build(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> Node {
        let n = indices.len();
        let labels: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let stop = n < self.min_samples_split
            || self.max_depth.is_some_and(|d| depth >= d)
            || Self::is_pure(&labels);
        if stop {
            return self.leaf(&labels);
        }

        let Some((feature, threshold)) = self.best_split(x, y, indices) else {
            return self.leaf(&labels);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] <= threshold);
        if left_idx.len() < self.min_samples_leaf || right_idx.len() < self.min_samples_leaf {
            return self.leaf(&labels);
        }

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.build(x, y, &left_idx, depth + 1)),
            right: Box::new(self.build(x, y, &right_idx, depth + 1)),
        }
    }

    fn leaf(&self, labels: &[f64]) -> Node {
        let mean = labels.iter().sum::<f64>() / labels.len().max(1) as f64;
        let value = if self.classification {
            if mean >= 0.5 {
                1.0
            } else {
                0.0
            }
        } else {
            mean
        };
        Node::Leaf { value, mean }
    }

    /// Best (feature, threshold) by impurity gain, scanning features in
    /// parallel and sweeping sorted values within each feature
    fn best_split(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<(usize, f64)> {
        let n = indices.len() as f64;
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent = self.impurity(indices.len(), total_sum, total_sq);

        let per_feature: Vec<Option<(usize, f64, f64)>> = (0..x.ncols())
            .into_par_iter()
            .map(|j| {
                let mut pairs: Vec<(f64, f64)> =
                    indices.iter().map(|&i| (x[[i, j]], y[i])).collect();
                pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

                let mut best: Option<(f64, f64)> = None; // (gain, threshold)
                let mut left_n = 0usize;
                let mut left_sum = 0.0;
                let mut left_sq = 0.0;

                for k in 0..pairs.len() - 1 {
                    left_n += 1;
                    left_sum += pairs[k].1;
                    left_sq += pairs[k].1 * pairs[k].1;

                    // Only cut between distinct feature values
                    if pairs[k].0 == pairs[k + 1].0 {
                        continue;
                    }
                    let right_n = pairs.len() - left_n;
                    if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                        continue;
                    }

                    let left_imp = self.impurity(left_n, left_sum, left_sq);
                    let right_imp =
                        self.impurity(right_n, total_sum - left_sum, total_sq - left_sq);
                    let weighted =
                        (left_n as f64 * left_imp + right_n as f64 * right_imp) / n;
                    let gain = parent - weighted;

                    if gain > 0.0 && best.map_or(true, |(g, _)| gain > g) {
                        best = Some((gain, (pairs[k].0 + pairs[k + 1].0) / 2.0));
                    }
                }
                best.map(|(gain, threshold)| (j, threshold, gain))
            })
            .collect();

        // First feature wins gain ties, keeping the tree deterministic
        let mut winner: Option<(usize, f64, f64)> = None;
        for candidate in per_feature.into_iter().flatten() {
            match winner {
                Some((_, _, g)) if candidate.2 <= g => {}
                _ => winner = Some(candidate),
            }
        }
        winner.map(|(feature, threshold, _)| (feature, threshold))
    }

    /// Impurity from count/sum/sum-of-squares: binary Gini for
    /// classification, variance for regression
    fn impurity(&self, count: usize, sum: f64, sq_sum: f64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let n = count as f64;
        if self.classification {
            let p = sum / n;
            2.0 * p * (1.0 - p)
        } else {
            (sq_sum / n - (sum / n).powi(2)).max(0.0)
        }
    }

    fn is_pure(labels: &[f64]) -> bool {
        labels
            .first()
            .map(|&first| labels.iter().all(|&v| (v - first).abs() < 1e-12))
            .unwrap_or(true)
    }
}

/// Decision tree classifier for binary labels
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    tree: Cart,
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self {
            tree: Cart::classifier(),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.tree = self.tree.with_max_depth(depth);
        self
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.tree.fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.tree.predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.tree.predict_mean(x))
    }
}

/// Decision tree regressor
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    tree: Cart,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            tree: Cart::regressor(),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.tree = self.tree.with_max_depth(depth);
        self
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.tree.fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.tree.predict(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_separable_data() {
        let x = array![[0.0], [0.1], [0.2], [0.9], [1.0], [1.1]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&x).unwrap();
        assert_eq!(pred, y);
    }

    #[test]
    fn test_classifier_proba_in_unit_interval() {
        let x = array![[0.0], [0.5], [1.0], [1.5]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).unwrap();
        let proba = tree.predict_proba(&x).unwrap().unwrap();
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_regressor_piecewise_constant() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&x).unwrap();
        assert!((pred[0] - 5.0).abs() < 1e-9);
        assert!((pred[5] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_depth_limits_overfit() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

        let mut stump = DecisionTreeRegressor::new().with_max_depth(1);
        stump.fit(&x, &y).unwrap();
        let pred = stump.predict(&x).unwrap();
        // Depth 1 means exactly one split, so at most two distinct outputs
        let mut distinct: Vec<f64> = pred.to_vec();
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap());
        distinct.dedup();
        assert!(distinct.len() <= 2);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let tree = DecisionTreeClassifier::new();
        assert!(tree.predict(&array![[1.0]]).is_err());
    }
}

//! XGBoost-style boosting with second-order approximation
//!
//! Trees are grown on gradient/hessian statistics with regularized leaf
//! weights (w* = -G / (H + lambda)) and gain-based split scoring. Squared
//! error for regression, log loss for binary classification.

use crate::error::{BenchError, Result};
use crate::models::{check_fit_shapes, sigmoid, Classifier, Regressor};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// XGBoost hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// Minimum gain to keep a split
    pub gamma: f64,
    /// Row subsample ratio per round
    pub subsample: f64,
    pub seed: u64,
}

impl Default for XgbConfig {
    fn default() -> Self {
        Self {
            n_estimators: 20,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum XgbNode {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<XgbNode>,
        right: Box<XgbNode>,
    },
}

impl XgbNode {
    fn score(&self, row: ndarray::ArrayView1<f64>) -> f64 {
        match self {
            XgbNode::Leaf { weight } => *weight,
            XgbNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.score(row)
                } else {
                    right.score(row)
                }
            }
        }
    }
}

fn leaf_weight(g: f64, h: f64, lambda: f64) -> f64 {
    -g / (h + lambda)
}

fn split_gain(gl: f64, hl: f64, gr: f64, hr: f64, lambda: f64) -> f64 {
    let score = |g: f64, h: f64| g * g / (h + lambda);
    0.5 * (score(gl, hl) + score(gr, hr) - score(gl + gr, hl + hr))
}

/// Grow one tree on gradient/hessian statistics, exact greedy splits
fn build_tree(
    x: &Array2<f64>,
    grad: &Array1<f64>,
    hess: &Array1<f64>,
    indices: &[usize],
    depth: usize,
    config: &XgbConfig,
) -> XgbNode {
    let g_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h_sum: f64 = indices.iter().map(|&i| hess[i]).sum();
    let leaf = XgbNode::Leaf {
        weight: leaf_weight(g_sum, h_sum, config.reg_lambda),
    };

    if depth >= config.max_depth || indices.len() < 2 || h_sum < config.min_child_weight {
        return leaf;
    }

    // Per-feature best split via sorted sweep over (value, grad, hess)
    let per_feature: Vec<Option<(usize, f64, f64)>> = (0..x.ncols())
        .into_par_iter()
        .map(|j| {
            let mut triples: Vec<(f64, f64, f64)> = indices
                .iter()
                .map(|&i| (x[[i, j]], grad[i], hess[i]))
                .collect();
            triples.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut best: Option<(f64, f64)> = None; // (gain, threshold)
            let mut gl = 0.0;
            let mut hl = 0.0;
            for k in 0..triples.len() - 1 {
                gl += triples[k].1;
                hl += triples[k].2;
                if triples[k].0 == triples[k + 1].0 {
                    continue;
                }
                let gr = g_sum - gl;
                let hr = h_sum - hl;
                if hl < config.min_child_weight || hr < config.min_child_weight {
                    continue;
                }
                let gain = split_gain(gl, hl, gr, hr, config.reg_lambda) - config.gamma;
                if gain > 0.0 && best.map_or(true, |(g, _)| gain > g) {
                    best = Some((gain, (triples[k].0 + triples[k + 1].0) / 2.0));
                }
            }
            best.map(|(gain, threshold)| (j, threshold, gain))
        })
        .collect();

    let mut winner: Option<(usize, f64, f64)> = None;
    for candidate in per_feature.into_iter().flatten() {
        match winner {
            Some((_, _, g)) if candidate.2 <= g => {}
            _ => winner = Some(candidate),
        }
    }
    let Some((feature, threshold, _)) = winner else {
        return leaf;
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[[i, feature]] <= threshold);
    if left_idx.is_empty() || right_idx.is_empty() {
        return leaf;
    }

    XgbNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(x, grad, hess, &left_idx, depth + 1, config)),
        right: Box::new(build_tree(x, grad, hess, &right_idx, depth + 1, config)),
    }
}

#[derive(Debug, Clone)]
struct Booster {
    config: XgbConfig,
    trees: Vec<XgbNode>,
    base_score: f64,
}

impl Booster {
    fn new(config: XgbConfig, base_score: f64) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score,
        }
    }

    fn raw_scores(&self, x: &Array2<f64>) -> Array1<f64> {
        let mut scores = Array1::from_elem(x.nrows(), self.base_score);
        for tree in &self.trees {
            for (i, s) in scores.iter_mut().enumerate() {
                *s += self.config.learning_rate * tree.score(x.row(i));
            }
        }
        scores
    }

    /// One boosting run; `grad_hess` maps (label, score) to (g, h)
    fn boost(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        grad_hess: impl Fn(f64, f64) -> (f64, f64),
    ) -> Result<()> {
        let n = x.nrows();
        let mut scores = Array1::from_elem(n, self.base_score);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);

        for _ in 0..self.config.n_estimators {
            let mut grad = Array1::zeros(n);
            let mut hess = Array1::zeros(n);
            for i in 0..n {
                let (g, h) = grad_hess(y[i], scores[i]);
                grad[i] = g;
                hess[i] = h;
            }

            let rows: Vec<usize> = if self.config.subsample >= 1.0 {
                (0..n).collect()
            } else {
                let size = ((n as f64) * self.config.subsample).ceil().max(1.0) as usize;
                let mut idx: Vec<usize> = (0..n).collect();
                idx.shuffle(&mut rng);
                idx.truncate(size);
                idx.sort_unstable();
                idx
            };

            let tree = build_tree(x, &grad, &hess, &rows, 0, &self.config);
            for i in 0..n {
                scores[i] += self.config.learning_rate * tree.score(x.row(i));
            }
            self.trees.push(tree);
        }
        Ok(())
    }
}

/// XGBoost-style regressor (squared error objective)
#[derive(Debug, Clone)]
pub struct XgbRegressor {
    booster: Option<Booster>,
    config: XgbConfig,
}

impl XgbRegressor {
    pub fn new(config: XgbConfig) -> Self {
        Self {
            booster: None,
            config,
        }
    }
}

impl Regressor for XgbRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let base = y.mean().unwrap_or(0.0);
        let mut booster = Booster::new(self.config.clone(), base);
        // Squared error: g = pred - y, h = 1
        booster.boost(x, y, |yi, score| (score - yi, 1.0))?;
        self.booster = Some(booster);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let booster = self.booster.as_ref().ok_or(BenchError::NotFitted)?;
        Ok(booster.raw_scores(x))
    }
}

/// XGBoost-style binary classifier (log loss objective)
#[derive(Debug, Clone)]
pub struct XgbClassifier {
    booster: Option<Booster>,
    config: XgbConfig,
}

impl XgbClassifier {
    pub fn new(config: XgbConfig) -> Self {
        Self {
            booster: None,
            config,
        }
    }

    fn probabilities(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let booster = self.booster.as_ref().ok_or(BenchError::NotFitted)?;
        Ok(booster.raw_scores(x).mapv(sigmoid))
    }
}

impl Classifier for XgbClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let p = y.mean().unwrap_or(0.5).clamp(1e-6, 1.0 - 1e-6);
        let base = (p / (1.0 - p)).ln();
        let mut booster = Booster::new(self.config.clone(), base);
        // Log loss: g = p - y, h = p (1 - p)
        booster.boost(x, y, |yi, score| {
            let p = sigmoid(score);
            (p - yi, (p * (1.0 - p)).max(1e-16))
        })?;
        self.booster = Some(booster);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .probabilities(x)?
            .mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.probabilities(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_regressor_fits_quadratic() {
        let x = Array2::from_shape_fn((50, 1), |(i, _)| i as f64 * 0.1);
        let y: Array1<f64> = (0..50).map(|i| (i as f64 * 0.1).powi(2)).collect();

        let mut model = XgbRegressor::new(XgbConfig {
            n_estimators: 50,
            learning_rate: 0.3,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let mae: f64 =
            pred.iter().zip(y.iter()).map(|(p, t)| (p - t).abs()).sum::<f64>() / 50.0;
        assert!(mae < 0.5, "mae {}", mae);
    }

    #[test]
    fn test_classifier_accuracy_on_split_feature() {
        let x = Array2::from_shape_fn((60, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                (i % 3) as f64
            }
        });
        let y: Array1<f64> = (0..60).map(|i| if i < 30 { 0.0 } else { 1.0 }).collect();

        let mut model = XgbClassifier::new(XgbConfig::default());
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let correct = pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 56);
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let model = XgbRegressor::new(XgbConfig::default());
        assert!(model.predict(&Array2::zeros((1, 1))).is_err());
    }
}

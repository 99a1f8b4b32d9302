//! Gradient boosted trees
//!
//! Shallow regression trees fitted to residuals with shrinkage. The
//! classifier boosts log-odds and squashes through a sigmoid for
//! probabilities.

use crate::error::{BenchError, Result};
use crate::models::decision_tree::Cart;
use crate::models::{check_fit_shapes, sigmoid, Classifier, Regressor};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Boosting hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Row subsample ratio per boosting round
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 20,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
            seed: 42,
        }
    }
}

fn subsample_rows(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let size = ((n as f64) * ratio).ceil().max(1.0) as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(size);
    indices.sort_unstable();
    indices
}

/// Gradient boosting regressor
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    trees: Vec<Cart>,
    initial_prediction: f64,
    is_fitted: bool,
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            initial_prediction: 0.0,
            is_fitted: false,
        }
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();
        self.initial_prediction = y.mean().unwrap_or(0.0);
        let mut predictions = Array1::from_elem(n, self.initial_prediction);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);

        for _ in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y - &predictions;
            let rows = subsample_rows(n, self.config.subsample, &mut rng);
            let x_sub = x.select(Axis(0), &rows);
            let r_sub: Array1<f64> = rows.iter().map(|&i| residuals[i]).collect();

            let mut tree = Cart::regressor().with_max_depth(self.config.max_depth);
            tree.fit(&x_sub, &r_sub)?;

            let update = tree.predict(x)?;
            predictions = predictions + update * self.config.learning_rate;
            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(BenchError::NotFitted);
        }
        let mut out = Array1::from_elem(x.nrows(), self.initial_prediction);
        for tree in &self.trees {
            out = out + tree.predict(x)? * self.config.learning_rate;
        }
        Ok(out)
    }
}

/// Gradient boosting classifier for binary labels
#[derive(Debug, Clone)]
pub struct GradientBoostingClassifier {
    config: GradientBoostingConfig,
    trees: Vec<Cart>,
    initial_log_odds: f64,
    is_fitted: bool,
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            initial_log_odds: 0.0,
            is_fitted: false,
        }
    }

    fn raw_scores(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(BenchError::NotFitted);
        }
        let mut scores = Array1::from_elem(x.nrows(), self.initial_log_odds);
        for tree in &self.trees {
            scores = scores + tree.predict(x)? * self.config.learning_rate;
        }
        Ok(scores)
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();
        let p = y.mean().unwrap_or(0.5).clamp(1e-6, 1.0 - 1e-6);
        self.initial_log_odds = (p / (1.0 - p)).ln();

        let mut log_odds = Array1::from_elem(n, self.initial_log_odds);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);

        for _ in 0..self.config.n_estimators {
            // Negative gradient of log loss: y - sigmoid(score)
            let residuals: Array1<f64> =
                y.iter().zip(log_odds.iter()).map(|(yi, s)| yi - sigmoid(*s)).collect();

            let rows = subsample_rows(n, self.config.subsample, &mut rng);
            let x_sub = x.select(Axis(0), &rows);
            let r_sub: Array1<f64> = rows.iter().map(|&i| residuals[i]).collect();

            let mut tree = Cart::regressor().with_max_depth(self.config.max_depth);
            tree.fit(&x_sub, &r_sub)?;

            let update = tree.predict(x)?;
            log_odds = log_odds + update * self.config.learning_rate;
            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .raw_scores(x)?
            .mapv(|s| if sigmoid(s) >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.raw_scores(x).map(|scores| scores.mapv(sigmoid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_regressor_fits_linear_trend() {
        let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
        let y: Array1<f64> = (0..40).map(|i| 2.0 * i as f64 + 1.0).collect();

        let mut model = GradientBoostingRegressor::new(GradientBoostingConfig {
            n_estimators: 50,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();

        let mae: f64 =
            pred.iter().zip(y.iter()).map(|(p, t)| (p - t).abs()).sum::<f64>() / 40.0;
        assert!(mae < 5.0, "mae {}", mae);
    }

    #[test]
    fn test_classifier_separates_halves() {
        let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
        let y: Array1<f64> = (0..40).map(|i| if i < 20 { 0.0 } else { 1.0 }).collect();

        let mut model = GradientBoostingClassifier::new(GradientBoostingConfig::default());
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        let correct = pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 36);
    }

    #[test]
    fn test_classifier_proba_monotone_with_feature() {
        let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
        let y: Array1<f64> = (0..40).map(|i| if i < 20 { 0.0 } else { 1.0 }).collect();

        let mut model = GradientBoostingClassifier::new(GradientBoostingConfig::default());
        model.fit(&x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap().unwrap();
        assert!(proba[0] < proba[39]);
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}

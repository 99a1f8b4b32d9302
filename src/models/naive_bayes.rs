//! Gaussian naive Bayes
//!
//! Per-class feature means and variances under the independence
//! assumption. Variances get a smoothing floor proportional to the
//! largest feature variance so constant features cannot blow up the
//! likelihood.

use crate::error::{BenchError, Result};
use crate::models::{check_fit_shapes, Classifier};
use ndarray::{Array1, Array2};

const VAR_SMOOTHING: f64 = 1e-9;

#[derive(Debug, Clone)]
struct ClassStats {
    label: f64,
    prior: f64,
    means: Array1<f64>,
    variances: Array1<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct GaussianNaiveBayes {
    classes: Vec<ClassStats>,
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log joint likelihood of each class for one row
    fn log_joint(&self, row: ndarray::ArrayView1<f64>) -> Vec<f64> {
        self.classes
            .iter()
            .map(|stats| {
                let mut log_prob = stats.prior.ln();
                for (j, &value) in row.iter().enumerate() {
                    let var = stats.variances[j];
                    let diff = value - stats.means[j];
                    log_prob += -0.5 * ((2.0 * std::f64::consts::PI * var).ln()
                        + diff * diff / var);
                }
                log_prob
            })
            .collect()
    }

    /// Normalized posterior of the positive class
    fn positive_posterior(&self, row: ndarray::ArrayView1<f64>) -> f64 {
        let log_joint = self.log_joint(row);
        let max = log_joint.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let unnormalized: Vec<f64> = log_joint.iter().map(|&lp| (lp - max).exp()).collect();
        let total: f64 = unnormalized.iter().sum();
        self.classes
            .iter()
            .zip(unnormalized.iter())
            .filter(|(stats, _)| stats.label == 1.0)
            .map(|(_, p)| p / total)
            .sum()
    }
}

impl Classifier for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();
        let p = x.ncols();

        let mut labels: Vec<f64> = y.to_vec();
        labels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        labels.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        // Smoothing floor scaled by the largest overall feature variance
        let overall_max_var = (0..p)
            .map(|j| {
                let col = x.column(j);
                let mean = col.mean().unwrap_or(0.0);
                col.mapv(|v| (v - mean).powi(2)).sum() / n as f64
            })
            .fold(0.0f64, f64::max);
        let floor = VAR_SMOOTHING * overall_max_var.max(1.0);

        self.classes = labels
            .iter()
            .map(|&label| {
                let rows: Vec<usize> = (0..n)
                    .filter(|&i| (y[i] - label).abs() < 1e-12)
                    .collect();
                let count = rows.len() as f64;
                let mut means = Array1::<f64>::zeros(p);
                let mut variances = Array1::<f64>::zeros(p);
                for j in 0..p {
                    let mean = rows.iter().map(|&i| x[[i, j]]).sum::<f64>() / count;
                    let var = rows
                        .iter()
                        .map(|&i| (x[[i, j]] - mean).powi(2))
                        .sum::<f64>()
                        / count;
                    means[j] = mean;
                    variances[j] = var + floor;
                }
                ClassStats {
                    label,
                    prior: count / n as f64,
                    means,
                    variances,
                }
            })
            .collect();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.classes.is_empty() {
            return Err(BenchError::NotFitted);
        }
        let out: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let log_joint = self.log_joint(x.row(i));
                let best = log_joint
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0);
                self.classes[best].label
            })
            .collect();
        Ok(Array1::from_vec(out))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        if self.classes.is_empty() {
            return Some(Err(BenchError::NotFitted));
        }
        let out: Vec<f64> = (0..x.nrows())
            .map(|i| self.positive_posterior(x.row(i)))
            .collect();
        Some(Ok(Array1::from_vec(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separated_gaussians() {
        let x = array![[0.0], [0.2], [-0.1], [0.1], [5.0], [5.2], [4.9], [5.1]];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();
        let pred = nb.predict(&array![[0.05], [5.05]]).unwrap();
        assert_eq!(pred, array![0.0, 1.0]);
    }

    #[test]
    fn test_posterior_sums_make_sense() {
        let x = array![[0.0], [0.1], [5.0], [5.1]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();
        let proba = nb.predict_proba(&array![[0.05], [5.05]]).unwrap().unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[1] > 0.5);
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_constant_feature_does_not_panic() {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 5.0], [1.0, 6.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();
        let pred = nb.predict(&x).unwrap();
        assert_eq!(pred, y);
    }

    #[test]
    fn test_unfitted_fails() {
        let nb = GaussianNaiveBayes::new();
        assert!(nb.predict(&array![[1.0]]).is_err());
    }
}

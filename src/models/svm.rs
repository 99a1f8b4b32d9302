//! Support vector machines with an RBF kernel
//!
//! The classifier runs simplified SMO on the dual problem; the regressor
//! does projected gradient ascent on the epsilon-insensitive dual. Both
//! precompute the kernel matrix, so training is capped to a sample budget.

use crate::error::{BenchError, Result};
use crate::models::{check_fit_shapes, Classifier, Regressor};
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Kernel matrix is O(n^2) memory; refuse to train past this
const MAX_KERNEL_MATRIX_SAMPLES: usize = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Soft-margin penalty
    pub c: f64,
    /// RBF width; `None` means 1 / n_features
    pub gamma: Option<f64>,
    /// Epsilon tube for regression
    pub epsilon: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            gamma: None,
            epsilon: 0.1,
            max_iter: 100,
            tol: 1e-3,
            seed: 42,
        }
    }
}

fn rbf(a: ndarray::ArrayView1<f64>, b: ndarray::ArrayView1<f64>, gamma: f64) -> f64 {
    let sq_dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
    (-gamma * sq_dist).exp()
}

fn kernel_matrix(x: &Array2<f64>, gamma: f64) -> Result<Array2<f64>> {
    let n = x.nrows();
    if n > MAX_KERNEL_MATRIX_SAMPLES {
        return Err(BenchError::Training(format!(
            "kernel matrix would need {n}x{n} entries, above the {MAX_KERNEL_MATRIX_SAMPLES} sample cap"
        )));
    }
    let mut k = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let v = rbf(x.row(i), x.row(j), gamma);
            k[[i, j]] = v;
            k[[j, i]] = v;
        }
    }
    Ok(k)
}

fn effective_gamma(config: &SvmConfig, n_features: usize) -> f64 {
    config.gamma.unwrap_or(1.0 / n_features.max(1) as f64)
}

/// RBF kernel SVM classifier trained with simplified SMO.
///
/// Emits hard decisions only; there is no probability estimate.
#[derive(Debug, Clone)]
pub struct SvmClassifier {
    config: SvmConfig,
    support_vectors: Option<Array2<f64>>,
    /// alpha_i * y_i per support vector
    dual_coef: Array1<f64>,
    bias: f64,
    gamma: f64,
}

impl SvmClassifier {
    pub fn new(config: SvmConfig) -> Self {
        Self {
            config,
            support_vectors: None,
            dual_coef: Array1::zeros(0),
            bias: 0.0,
            gamma: 1.0,
        }
    }

    fn decision(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let sv = self.support_vectors.as_ref().ok_or(BenchError::NotFitted)?;
        let out: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i);
                let mut score = self.bias;
                for (s, &coef) in self.dual_coef.iter().enumerate() {
                    score += coef * rbf(row, sv.row(s), self.gamma);
                }
                score
            })
            .collect();
        Ok(Array1::from_vec(out))
    }
}

impl Classifier for SvmClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();
        self.gamma = effective_gamma(&self.config, x.ncols());
        let k = kernel_matrix(x, self.gamma)?;

        // Map 0/1 labels to -1/+1 for the dual
        let y_signed: Array1<f64> = y.mapv(|v| if v > 0.5 { 1.0 } else { -1.0 });
        let c = self.config.c;
        let tol = self.config.tol;
        let mut alphas = Array1::<f64>::zeros(n);
        let mut bias = 0.0f64;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let decision = |alphas: &Array1<f64>, bias: f64, i: usize, k: &Array2<f64>| -> f64 {
            let mut score = bias;
            for t in 0..n {
                if alphas[t] != 0.0 {
                    score += alphas[t] * y_signed[t] * k[[t, i]];
                }
            }
            score
        };

        let mut quiet_passes = 0usize;
        let outer_rounds = if n < 2 {
            0
        } else {
            self.config.max_iter.max(1) * 10
        };
        for _ in 0..outer_rounds {
            let mut changed = 0usize;
            for i in 0..n {
                let e_i = decision(&alphas, bias, i, &k) - y_signed[i];
                let violates = (y_signed[i] * e_i < -tol && alphas[i] < c)
                    || (y_signed[i] * e_i > tol && alphas[i] > 0.0);
                if !violates {
                    continue;
                }

                let mut j = rng.gen_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let e_j = decision(&alphas, bias, j, &k) - y_signed[j];

                let (alpha_i_old, alpha_j_old) = (alphas[i], alphas[j]);
                let (low, high) = if y_signed[i] != y_signed[j] {
                    (
                        (alpha_j_old - alpha_i_old).max(0.0),
                        (c + alpha_j_old - alpha_i_old).min(c),
                    )
                } else {
                    (
                        (alpha_i_old + alpha_j_old - c).max(0.0),
                        (alpha_i_old + alpha_j_old).min(c),
                    )
                };
                if (high - low).abs() < 1e-12 {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let mut alpha_j = alpha_j_old - y_signed[j] * (e_i - e_j) / eta;
                alpha_j = alpha_j.clamp(low, high);
                if (alpha_j - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i =
                    alpha_i_old + y_signed[i] * y_signed[j] * (alpha_j_old - alpha_j);

                let b1 = bias
                    - e_i
                    - y_signed[i] * (alpha_i - alpha_i_old) * k[[i, i]]
                    - y_signed[j] * (alpha_j - alpha_j_old) * k[[i, j]];
                let b2 = bias
                    - e_j
                    - y_signed[i] * (alpha_i - alpha_i_old) * k[[i, j]]
                    - y_signed[j] * (alpha_j - alpha_j_old) * k[[j, j]];
                bias = if alpha_i > 0.0 && alpha_i < c {
                    b1
                } else if alpha_j > 0.0 && alpha_j < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                alphas[i] = alpha_i;
                alphas[j] = alpha_j;
                changed += 1;
            }
            if changed == 0 {
                quiet_passes += 1;
                if quiet_passes >= 3 {
                    break;
                }
            } else {
                quiet_passes = 0;
            }
        }

        // Keep only support vectors
        let support: Vec<usize> = (0..n).filter(|&i| alphas[i] > 1e-8).collect();
        let sv = x.select(ndarray::Axis(0), &support);
        let dual_coef: Array1<f64> =
            support.iter().map(|&i| alphas[i] * y_signed[i]).collect();

        self.support_vectors = Some(sv);
        self.dual_coef = dual_coef;
        self.bias = bias;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision(x)?
            .mapv(|s| if s >= 0.0 { 1.0 } else { 0.0 }))
    }
}

/// Epsilon-insensitive RBF kernel SVR
#[derive(Debug, Clone)]
pub struct SvmRegressor {
    config: SvmConfig,
    x_train: Option<Array2<f64>>,
    /// alpha_i - alpha_i^* per training row
    dual_coef: Array1<f64>,
    bias: f64,
    gamma: f64,
}

impl SvmRegressor {
    pub fn new(config: SvmConfig) -> Self {
        Self {
            config,
            x_train: None,
            dual_coef: Array1::zeros(0),
            bias: 0.0,
            gamma: 1.0,
        }
    }
}

impl Regressor for SvmRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows();
        self.gamma = effective_gamma(&self.config, x.ncols());
        let k = kernel_matrix(x, self.gamma)?;

        let c = self.config.c;
        let epsilon = self.config.epsilon;
        let learning_rate = 0.01;
        let mut beta = Array1::<f64>::zeros(n);
        let mut bias = y.mean().unwrap_or(0.0);

        for _ in 0..self.config.max_iter.max(1) * 10 {
            let mut max_update = 0.0f64;
            for i in 0..n {
                let pred = k.row(i).dot(&beta) + bias;
                let error = pred - y[i];
                // Inside the epsilon tube the dual gradient vanishes
                if error.abs() <= epsilon {
                    continue;
                }
                let gradient = error - epsilon * error.signum();
                let new_beta = (beta[i] - learning_rate * gradient).clamp(-c, c);
                let update = (new_beta - beta[i]).abs();
                beta[i] = new_beta;
                bias -= learning_rate * error.signum() * 0.1;
                max_update = max_update.max(update);
            }
            if max_update < self.config.tol {
                break;
            }
        }

        self.x_train = Some(x.clone());
        self.dual_coef = beta;
        self.bias = bias;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(BenchError::NotFitted)?;
        let out: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row = x.row(i);
                let mut pred = self.bias;
                for (t, &coef) in self.dual_coef.iter().enumerate() {
                    if coef != 0.0 {
                        pred += coef * rbf(row, x_train.row(t), self.gamma);
                    }
                }
                pred
            })
            .collect();
        Ok(Array1::from_vec(out))
    }
}

//! Linear models: OLS, ridge, lasso, and logistic regression
//!
//! OLS and ridge solve the normal equations through a small Cholesky
//! factorization. Lasso runs coordinate descent with soft-thresholding.
//! Logistic regression is batch gradient descent on the log loss.

use crate::error::{BenchError, Result};
use ndarray::{Array1, Array2, Axis};

use crate::models::{check_fit_shapes, sigmoid, Classifier, Regressor};

/// Solve `a x = b` for a symmetric positive-definite `a`
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(BenchError::Shape {
            expected: format!("{n}x{n} matrix with length-{n} rhs"),
            actual: format!("{}x{} matrix with length-{} rhs", a.nrows(), a.ncols(), b.len()),
        });
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(BenchError::Training(
                        "normal equations matrix is not positive definite".to_string(),
                    ));
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward then backward substitution
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in i + 1..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }
    Ok(x)
}

fn column_means(x: &Array2<f64>) -> Array1<f64> {
    x.mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()))
}

fn center(x: &Array2<f64>, means: &Array1<f64>) -> Array2<f64> {
    x - &means.view().insert_axis(Axis(0))
}

/// Fit centered least squares with an optional L2 penalty; returns
/// (coefficients, intercept)
fn solve_least_squares(
    x: &Array2<f64>,
    y: &Array1<f64>,
    l2: f64,
) -> Result<(Array1<f64>, f64)> {
    let x_means = column_means(x);
    let y_mean = y.mean().unwrap_or(0.0);
    let xc = center(x, &x_means);
    let yc = y - y_mean;

    let mut gram = xc.t().dot(&xc);
    // Jitter keeps the factorization stable on collinear features
    let jitter = l2.max(1e-10);
    for d in 0..gram.nrows() {
        gram[[d, d]] += jitter;
    }
    let rhs = xc.t().dot(&yc);
    let coefficients = cholesky_solve(&gram, &rhs)?;
    let intercept = y_mean - coefficients.dot(&x_means);
    Ok((coefficients, intercept))
}

/// Ordinary least squares
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let (coefficients, intercept) = solve_least_squares(x, y, 0.0)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.coefficients.as_ref().ok_or(BenchError::NotFitted)?;
        Ok(x.dot(w) + self.intercept)
    }
}

/// Ridge regression (L2-penalized least squares, intercept unpenalized)
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    pub alpha: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        if self.alpha < 0.0 {
            return Err(BenchError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        let (coefficients, intercept) = solve_least_squares(x, y, self.alpha)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.coefficients.as_ref().ok_or(BenchError::NotFitted)?;
        Ok(x.dot(w) + self.intercept)
    }
}

/// Lasso via cyclic coordinate descent
#[derive(Debug, Clone)]
pub struct LassoRegression {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: 1000,
            tol: 1e-4,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

impl Regressor for LassoRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows() as f64;
        let p = x.ncols();

        let x_means = column_means(x);
        let y_mean = y.mean().unwrap_or(0.0);
        let xc = center(x, &x_means);
        let yc = y - y_mean;

        let col_sq: Vec<f64> = (0..p).map(|j| xc.column(j).mapv(|v| v * v).sum()).collect();
        let mut w = Array1::<f64>::zeros(p);
        let mut residual = yc.clone();

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0f64;
            for j in 0..p {
                if col_sq[j] == 0.0 {
                    continue;
                }
                let col = xc.column(j);
                // rho is the partial correlation with feature j excluded
                let rho = col.dot(&residual) + w[j] * col_sq[j];
                let new_w = soft_threshold(rho, self.alpha * n) / col_sq[j];
                let delta = new_w - w[j];
                if delta != 0.0 {
                    residual = residual - &(&col * delta);
                    max_delta = max_delta.max(delta.abs());
                    w[j] = new_w;
                }
            }
            if max_delta < self.tol {
                break;
            }
        }

        self.intercept = y_mean - w.dot(&x_means);
        self.coefficients = Some(w);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.coefficients.as_ref().ok_or(BenchError::NotFitted)?;
        Ok(x.dot(w) + self.intercept)
    }
}

/// Logistic regression trained with batch gradient descent
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tol: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            tol: 1e-6,
            weights: None,
            bias: 0.0,
        }
    }

    fn decision(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let w = self.weights.as_ref().ok_or(BenchError::NotFitted)?;
        Ok(x.dot(w) + self.bias)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        let n = x.nrows() as f64;
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0f64;

        for _ in 0..self.max_iter {
            let scores = x.dot(&w) + b;
            let probs = scores.mapv(sigmoid);
            let errors = &probs - y;

            let grad_w = x.t().dot(&errors) / n;
            let grad_b = errors.sum() / n;

            w = w - &(grad_w.mapv(|g| g * self.learning_rate));
            b -= grad_b * self.learning_rate;

            let grad_norm = grad_w.mapv(f64::abs).sum() + grad_b.abs();
            if grad_norm < self.tol {
                break;
            }
        }

        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision(x)?
            .mapv(|s| if sigmoid(s) >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.decision(x).map(|scores| scores.mapv(sigmoid)))
    }
}

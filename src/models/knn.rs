//! K-nearest neighbors classifier
//!
//! Lazy learner: fitting stores the training set, prediction scans it for
//! the k closest rows by Euclidean distance and votes. The positive vote
//! fraction doubles as the probability estimate.

use crate::error::{BenchError, Result};
use crate::models::{check_fit_shapes, Classifier};
use ndarray::{Array1, Array2};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct KnnClassifier {
    pub k: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KnnClassifier {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            x_train: None,
            y_train: None,
        }
    }

    /// Fraction of positive labels among the k nearest neighbors
    fn vote_fractions(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(BenchError::NotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(BenchError::NotFitted)?;
        if x.ncols() != x_train.ncols() {
            return Err(BenchError::Shape {
                expected: format!("{} columns", x_train.ncols()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let k = self.k.min(x_train.nrows()).max(1);
        let fractions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let query = x.row(i);
                let mut distances: Vec<(f64, f64)> = (0..x_train.nrows())
                    .map(|j| {
                        let d = query
                            .iter()
                            .zip(x_train.row(j).iter())
                            .map(|(a, b)| (a - b).powi(2))
                            .sum::<f64>();
                        (d, y_train[j])
                    })
                    .collect();
                distances.sort_by(|a, b| {
                    a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
                });
                distances.iter().take(k).map(|(_, label)| label).sum::<f64>() / k as f64
            })
            .collect();
        Ok(Array1::from_vec(fractions))
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_shapes(x, y)?;
        if self.k == 0 {
            return Err(BenchError::InvalidParameter {
                name: "k".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .vote_fractions(x)?
            .mapv(|f| if f >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        Some(self.vote_fractions(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_votes_follow_local_majority() {
        let x = array![[0.0], [0.1], [0.2], [5.0], [5.1], [5.2]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();
        let pred = knn.predict(&array![[0.05], [5.05]]).unwrap();
        assert_eq!(pred, array![0.0, 1.0]);
    }

    #[test]
    fn test_proba_is_vote_fraction() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.0, 1.0, 1.0];

        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();
        let proba = knn.predict_proba(&array![[1.0]]).unwrap().unwrap();
        assert!((proba[0] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_k_rejected() {
        let mut knn = KnnClassifier::new(0);
        let err = knn.fit(&array![[1.0]], &array![1.0]).unwrap_err();
        assert!(matches!(err, BenchError::InvalidParameter { .. }));
    }

    #[test]
    fn test_column_mismatch_rejected() {
        let mut knn = KnnClassifier::new(1);
        knn.fit(&array![[1.0, 2.0]], &array![1.0]).unwrap();
        assert!(knn.predict(&array![[1.0]]).is_err());
    }
}

//! Native model implementations
//!
//! The algorithm catalogue behind the benchmark:
//! - CART decision trees and bootstrap random forests
//! - Gradient boosting (residual fitting) and XGBoost-style second-order
//!   boosting
//! - Linear models: OLS, ridge, lasso, logistic regression
//! - K-nearest neighbors
//! - Gaussian naive Bayes
//! - Support vector machines (SMO classifier, kernel SVR)
//!
//! Every stochastic model takes an explicit seed; nothing reads ambient
//! process randomness.

pub mod decision_tree;
pub mod gradient_boosting;
pub mod knn;
pub mod linear;
pub mod naive_bayes;
pub mod random_forest;
pub mod svm;
pub mod xgboost;

pub use decision_tree::{DecisionTreeClassifier, DecisionTreeRegressor};
pub use gradient_boosting::{
    GradientBoostingClassifier, GradientBoostingConfig, GradientBoostingRegressor,
};
pub use knn::KnnClassifier;
pub use linear::{LassoRegression, LinearRegression, LogisticRegression, RidgeRegression};
pub use naive_bayes::GaussianNaiveBayes;
pub use random_forest::{RandomForestClassifier, RandomForestRegressor};
pub use svm::{SvmClassifier, SvmConfig, SvmRegressor};
pub use xgboost::{XgbClassifier, XgbConfig, XgbRegressor};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// Binary classifier over a numeric feature matrix.
///
/// Labels are 0.0/1.0. `predict_proba` returns the positive-class
/// probability when the model supports probability estimates; the default
/// is `None` and the harness substitutes a zero vector.
pub trait Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    fn predict_proba(&self, x: &Array2<f64>) -> Option<Result<Array1<f64>>> {
        let _ = x;
        None
    }
}

/// Regressor over a numeric feature matrix
pub trait Regressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Shape guard shared by the model implementations
pub(crate) fn check_fit_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(crate::error::BenchError::Shape {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(crate::error::BenchError::Training(
            "cannot fit on an empty matrix".to_string(),
        ));
    }
    Ok(())
}

/// Logistic sigmoid, used by every log-odds based model
pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

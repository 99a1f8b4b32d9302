//! Best-model selection
//!
//! Classification winners maximize weighted F1, regression winners
//! minimize RMSE. Comparisons are strict, so the earliest entry keeps a
//! tie. Empty result lists are left untouched.

use crate::report::{ClassificationResult, RegressionResult};

/// Flag the classifier with the highest weighted F1
pub fn mark_best_classification(results: &mut [ClassificationResult]) {
    let mut best: Option<usize> = None;
    for (i, result) in results.iter().enumerate() {
        match best {
            Some(b) if result.f1 <= results[b].f1 => {}
            _ => best = Some(i),
        }
    }
    if let Some(b) = best {
        for (i, result) in results.iter_mut().enumerate() {
            result.is_best = i == b;
        }
        tracing::info!(model = %results[b].model, f1 = results[b].f1, "best classifier");
    }
}

/// Flag the regressor with the lowest RMSE
pub fn mark_best_regression(results: &mut [RegressionResult]) {
    let mut best: Option<usize> = None;
    for (i, result) in results.iter().enumerate() {
        match best {
            Some(b) if result.rmse >= results[b].rmse => {}
            _ => best = Some(i),
        }
    }
    if let Some(b) = best {
        for (i, result) in results.iter_mut().enumerate() {
            result.is_best = i == b;
        }
        tracing::info!(model = %results[b].model, rmse = results[b].rmse, "best regressor");
    }
}

//! Benchmark harness: train, score, and rank the algorithm catalogue
//!
//! Each algorithm runs in isolation; a training or prediction failure is
//! logged and drops that entry from the results without aborting the
//! sweep.

pub mod metrics;
pub mod registry;
pub mod selector;

pub use registry::{
    classifier_catalogue, classifier_names, regressor_catalogue, regressor_names,
    select_classifiers, select_regressors, ClassifierEntry, RegressorEntry,
};
pub use selector::{mark_best_classification, mark_best_regression};

use crate::error::Result;
use crate::report::{ClassificationResult, RegressionResult};
use crate::split::TaskSplit;
use metrics::{accuracy, mae, r2, rmse, roc_auc, round4, weighted_f1};
use ndarray::Array1;

/// Runs every catalogue entry against one train/test split
#[derive(Debug, Clone)]
pub struct EvaluationHarness {
    seed: u64,
}

impl EvaluationHarness {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Train and score each classifier; failed entries are logged and
    /// skipped, then the survivors get their best-model flag
    pub fn run_classification(
        &self,
        entries: &[ClassifierEntry],
        split: &TaskSplit,
    ) -> Vec<ClassificationResult> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            tracing::debug!(model = entry.name, "training classifier");
            match self.evaluate_classifier(entry, split) {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::warn!(model = entry.name, error = %err, "classifier failed, skipping");
                }
            }
        }
        mark_best_classification(&mut results);
        results
    }

    /// Train and score each regressor with the same failure isolation
    pub fn run_regression(
        &self,
        entries: &[RegressorEntry],
        split: &TaskSplit,
    ) -> Vec<RegressionResult> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            tracing::debug!(model = entry.name, "training regressor");
            match self.evaluate_regressor(entry, split) {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::warn!(model = entry.name, error = %err, "regressor failed, skipping");
                }
            }
        }
        mark_best_regression(&mut results);
        results
    }

    fn evaluate_classifier(
        &self,
        entry: &ClassifierEntry,
        split: &TaskSplit,
    ) -> Result<ClassificationResult> {
        let mut model = (entry.build)(self.seed);
        model.fit(&split.x_train, &split.y_class_train)?;
        let predictions = model.predict(&split.x_test)?;

        // Models without probability estimates score zero AUC
        let scores = match model.predict_proba(&split.x_test) {
            Some(proba) => proba?,
            None => Array1::zeros(split.n_test()),
        };

        Ok(ClassificationResult {
            model: entry.name.to_string(),
            accuracy: round4(accuracy(&split.y_class_test, &predictions)),
            f1: round4(weighted_f1(&split.y_class_test, &predictions)),
            auc: round4(roc_auc(&split.y_class_test, &scores)),
            is_best: false,
        })
    }

    fn evaluate_regressor(
        &self,
        entry: &RegressorEntry,
        split: &TaskSplit,
    ) -> Result<RegressionResult> {
        let mut model = (entry.build)(self.seed);
        model.fit(&split.x_train, &split.y_reg_train)?;
        let predictions = model.predict(&split.x_test)?;

        Ok(RegressionResult {
            model: entry.name.to_string(),
            r2: round4(r2(&split.y_reg_test, &predictions)),
            mae: round4(mae(&split.y_reg_test, &predictions)),
            rmse: round4(rmse(&split.y_reg_test, &predictions)),
            is_best: false,
        })
    }
}

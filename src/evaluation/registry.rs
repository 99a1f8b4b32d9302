//! Algorithm catalogue
//!
//! Fixed rosters of classifiers and regressors, each entry pairing a
//! display name with a seeded constructor. Display names are the report
//! keys, so they stay stable across runs.

use crate::error::{BenchError, Result};
use crate::models::{
    Classifier, DecisionTreeClassifier, DecisionTreeRegressor, GaussianNaiveBayes,
    GradientBoostingClassifier, GradientBoostingConfig, GradientBoostingRegressor,
    KnnClassifier, LassoRegression, LinearRegression, LogisticRegression,
    RandomForestClassifier, RandomForestRegressor, Regressor, RidgeRegression, SvmClassifier,
    SvmConfig, SvmRegressor, XgbClassifier, XgbConfig, XgbRegressor,
};

const ENSEMBLE_TREES: usize = 20;
const KNN_NEIGHBORS: usize = 5;
const RIDGE_ALPHA: f64 = 1.0;
const LASSO_ALPHA: f64 = 0.1;

/// One classifier roster slot
pub struct ClassifierEntry {
    pub name: &'static str,
    pub build: fn(u64) -> Box<dyn Classifier>,
}

/// One regressor roster slot
#[derive(Debug)]
pub struct RegressorEntry {
    pub name: &'static str,
    pub build: fn(u64) -> Box<dyn Regressor>,
}

pub fn classifier_catalogue() -> Vec<ClassifierEntry> {
    vec![
        ClassifierEntry {
            name: "Random Forest",
            build: |seed| Box::new(RandomForestClassifier::new(ENSEMBLE_TREES, seed)),
        },
        ClassifierEntry {
            name: "XGBoost",
            build: |seed| {
                Box::new(XgbClassifier::new(XgbConfig {
                    n_estimators: ENSEMBLE_TREES,
                    seed,
                    ..Default::default()
                }))
            },
        },
        ClassifierEntry {
            name: "SVM",
            build: |seed| {
                Box::new(SvmClassifier::new(SvmConfig {
                    seed,
                    ..Default::default()
                }))
            },
        },
        ClassifierEntry {
            name: "Logistic Regression",
            build: |_| Box::new(LogisticRegression::new()),
        },
        ClassifierEntry {
            name: "KNN",
            build: |_| Box::new(KnnClassifier::new(KNN_NEIGHBORS)),
        },
        ClassifierEntry {
            name: "Decision Tree",
            build: |_| Box::new(DecisionTreeClassifier::new()),
        },
        ClassifierEntry {
            name: "Naive Bayes",
            build: |_| Box::new(GaussianNaiveBayes::new()),
        },
        ClassifierEntry {
            name: "Gradient Boosting",
            build: |seed| {
                Box::new(GradientBoostingClassifier::new(GradientBoostingConfig {
                    n_estimators: ENSEMBLE_TREES,
                    seed,
                    ..Default::default()
                }))
            },
        },
    ]
}

pub fn regressor_catalogue() -> Vec<RegressorEntry> {
    vec![
        RegressorEntry {
            name: "Random Forest",
            build: |seed| Box::new(RandomForestRegressor::new(ENSEMBLE_TREES, seed)),
        },
        RegressorEntry {
            name: "Gradient Boosting",
            build: |seed| {
                Box::new(GradientBoostingRegressor::new(GradientBoostingConfig {
                    n_estimators: ENSEMBLE_TREES,
                    seed,
                    ..Default::default()
                }))
            },
        },
        RegressorEntry {
            name: "Linear Regression",
            build: |_| Box::new(LinearRegression::new()),
        },
        RegressorEntry {
            name: "Ridge Regression",
            build: |_| Box::new(RidgeRegression::new(RIDGE_ALPHA)),
        },
        RegressorEntry {
            name: "Lasso",
            build: |_| Box::new(LassoRegression::new(LASSO_ALPHA)),
        },
        RegressorEntry {
            name: "SVR",
            build: |seed| {
                Box::new(SvmRegressor::new(SvmConfig {
                    seed,
                    ..Default::default()
                }))
            },
        },
        RegressorEntry {
            name: "XGBoost Regressor",
            build: |seed| {
                Box::new(XgbRegressor::new(XgbConfig {
                    n_estimators: ENSEMBLE_TREES,
                    seed,
                    ..Default::default()
                }))
            },
        },
        RegressorEntry {
            name: "Decision Tree Reg",
            build: |_| Box::new(DecisionTreeRegressor::new()),
        },
    ]
}

pub fn classifier_names() -> Vec<String> {
    classifier_catalogue()
        .iter()
        .map(|e| e.name.to_string())
        .collect()
}

pub fn regressor_names() -> Vec<String> {
    regressor_catalogue()
        .iter()
        .map(|e| e.name.to_string())
        .collect()
}

/// Catalogue entries matching the requested names, in catalogue order.
/// Unknown names are a configuration error rather than a silent skip.
pub fn select_classifiers(names: &[String]) -> Result<Vec<ClassifierEntry>> {
    check_known(names, &classifier_names(), "classifier")?;
    Ok(classifier_catalogue()
        .into_iter()
        .filter(|e| names.iter().any(|n| n == e.name))
        .collect())
}

pub fn select_regressors(names: &[String]) -> Result<Vec<RegressorEntry>> {
    check_known(names, &regressor_names(), "regressor")?;
    Ok(regressor_catalogue()
        .into_iter()
        .filter(|e| names.iter().any(|n| n == e.name))
        .collect())
}

fn check_known(requested: &[String], known: &[String], kind: &str) -> Result<()> {
    for name in requested {
        if !known.contains(name) {
            return Err(BenchError::Config(format!(
                "unknown {kind} {name:?}; available: {}",
                known.join(", ")
            )));
        }
    }
    Ok(())
}

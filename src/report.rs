//! Benchmark report types and JSON export
//!
//! The report schema is what downstream dashboards consume, so the field
//! names are fixed: `model`, `accuracy`, `f1`, `auc`, `isBest` for
//! classification and `model`, `r2`, `mae`, `rmse`, `isBest` for
//! regression.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One classifier's test-set scores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub model: String,
    pub accuracy: f64,
    pub f1: f64,
    pub auc: f64,
    #[serde(rename = "isBest")]
    pub is_best: bool,
}

/// One regressor's test-set scores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionResult {
    pub model: String,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    #[serde(rename = "isBest")]
    pub is_best: bool,
}

/// Full benchmark output for one dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsReport {
    pub classification: Vec<ClassificationResult>,
    pub regression: Vec<RegressionResult>,
    /// Set when the corresponding target column was absent and a seeded
    /// synthetic target was used instead
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic_classification_target: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic_regression_target: bool,
}

/// Serialize the report as pretty JSON, creating parent directories and
/// overwriting any existing file
pub fn export_report(report: &ResultsReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), "results written");
    Ok(())
}

pub fn load_report(path: &Path) -> Result<ResultsReport> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

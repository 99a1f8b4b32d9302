//! Benchmark run configuration
//!
//! Everything the pipeline hard-codes nowhere: input/output paths, the
//! train/test split parameters, the dataset column schema and the algorithm
//! catalogue are all configurable here. A config can be loaded from a JSON
//! file and individual fields overridden from the CLI.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Names of the well-known dataset columns.
///
/// Defaults follow the delivery-log export this harness was built for. Any
/// of these may be absent from the actual file; only the targets have a
/// defined fallback (synthetic vectors).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Row identifier, excluded from features
    pub id: String,
    /// Order date, source of the derived calendar features
    pub order_date: String,
    /// Shipping date, excluded from features
    pub ship_date: String,
    /// Delivery date, excluded from features
    pub delivery_date: String,
    /// Binary delay flag, classification target
    pub class_target: String,
    /// Delivery delay in days, regression target
    pub reg_target: String,
    /// Columns that leak the answer (precomputed deltas kept for reference)
    pub leakage: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            id: "order_id".to_string(),
            order_date: "date_commande".to_string(),
            ship_date: "date_expedition".to_string(),
            delivery_date: "date_livraison".to_string(),
            class_target: "retard".to_string(),
            reg_target: "delai_livraison".to_string(),
            leakage: vec!["ecart_delai".to_string(), "delai_prevu".to_string()],
        }
    }
}

impl ColumnSchema {
    /// The three raw date columns
    pub fn date_columns(&self) -> [&str; 3] {
        [&self.order_date, &self.ship_date, &self.delivery_date]
    }

    /// Columns that must never appear in the feature matrix:
    /// identifier, raw dates, both targets and known leakage columns.
    pub fn excluded_from_features(&self) -> Vec<&str> {
        let mut cols = vec![
            self.id.as_str(),
            self.order_date.as_str(),
            self.ship_date.as_str(),
            self.delivery_date.as_str(),
            self.class_target.as_str(),
            self.reg_target.as_str(),
        ];
        cols.extend(self.leakage.iter().map(|s| s.as_str()));
        cols
    }
}

/// Full benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Input CSV path
    pub input: PathBuf,
    /// Output JSON path
    pub output: PathBuf,
    /// Fraction of rows held out for testing
    pub test_fraction: f64,
    /// Seed for every source of randomness in the run
    pub seed: u64,
    /// Dataset column names
    pub columns: ColumnSchema,
    /// Classification algorithms to run, by registry name
    pub classifiers: Vec<String>,
    /// Regression algorithms to run, by registry name
    pub regressors: Vec<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("training_results.json"),
            test_fraction: 0.2,
            seed: 42,
            columns: ColumnSchema::default(),
            classifiers: crate::evaluation::classifier_names(),
            regressors: crate::evaluation::regressor_names(),
        }
    }
}

impl BenchConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| BenchError::Config(format!("invalid config: {}", e)))?;
        Ok(config)
    }

    /// Validate field ranges and required paths
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(BenchError::Config("input path is required".to_string()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(BenchError::InvalidParameter {
                name: "test_fraction".to_string(),
                value: self.test_fraction.to_string(),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }
        if self.classifiers.is_empty() && self.regressors.is_empty() {
            return Err(BenchError::Config(
                "at least one algorithm must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_full_catalogue() {
        let config = BenchConfig::default();
        assert_eq!(config.classifiers.len(), 8);
        assert_eq!(config.regressors.len(), 8);
        assert_eq!(config.seed, 42);
        assert!((config.test_fraction - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_missing_input() {
        let config = BenchConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let config = BenchConfig {
            input: PathBuf::from("data.csv"),
            test_fraction: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BenchError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_schema_exclusions_cover_targets_and_leakage() {
        let schema = ColumnSchema::default();
        let excluded = schema.excluded_from_features();
        assert!(excluded.contains(&"retard"));
        assert!(excluded.contains(&"delai_livraison"));
        assert!(excluded.contains(&"ecart_delai"));
        assert!(excluded.contains(&"order_id"));
    }

    #[test]
    fn test_config_roundtrip_json() {
        let config = BenchConfig {
            input: PathBuf::from("orders.csv"),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: BenchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.input, config.input);
        assert_eq!(back.classifiers, config.classifiers);
    }
}

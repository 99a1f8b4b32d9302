//! Label encoding for categorical columns
//!
//! Each distinct textual value maps to a small integer code. Codes are
//! assigned in the order values are first observed, so the mapping is a
//! deterministic function of row order. The fitted maps are retained on the
//! preprocessor output in case new rows ever need encoding with the same
//! vocabulary.

use crate::error::{BenchError, Result};
use polars::prelude::*;
use std::collections::HashMap;

/// Per-column label encoder
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    mappings: HashMap<String, HashMap<String, u32>>,
    is_fitted: bool,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the code map for each column, first-observed order
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for name in columns {
            let series = df
                .column(name)
                .map_err(|_| BenchError::ColumnNotFound(name.to_string()))?
                .as_materialized_series();
            let ca = series.str().map_err(|e| BenchError::Data(e.to_string()))?;

            let mut mapping: HashMap<String, u32> = HashMap::new();
            let mut next_code = 0u32;
            for val in ca.into_iter().flatten() {
                if !mapping.contains_key(val) {
                    mapping.insert(val.to_string(), next_code);
                    next_code += 1;
                }
            }
            self.mappings.insert(name.to_string(), mapping);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its numeric codes
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(BenchError::NotFitted);
        }

        let mut result = df.clone();
        for (name, mapping) in &self.mappings {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let series = column.as_materialized_series();
            let ca = series.str().map_err(|e| BenchError::Data(e.to_string()))?;

            // Unknown values become null and fall to the imputation policy
            let encoded: Float64Chunked = ca
                .into_iter()
                .map(|opt| opt.and_then(|v| mapping.get(v).map(|&code| code as f64)))
                .collect();

            result = result
                .with_column(encoded.with_name(series.name().clone()).into_series())?
                .clone();
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// The fitted vocabulary, column name to value-code map
    pub fn mappings(&self) -> &HashMap<String, HashMap<String, u32>> {
        &self.mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_first_observed_order() {
        let df = df!("transporteur" => &["ups", "dhl", "ups", "fedex"]).unwrap();
        let mut encoder = LabelEncoder::new();
        let result = encoder.fit_transform(&df, &["transporteur"]).unwrap();

        let ca = result.column("transporteur").unwrap().f64().unwrap();
        assert_eq!(ca.get(0), Some(0.0)); // ups first
        assert_eq!(ca.get(1), Some(1.0)); // dhl second
        assert_eq!(ca.get(2), Some(0.0));
        assert_eq!(ca.get(3), Some(2.0)); // fedex third
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let df = df!("c" => &["b", "a", "c", "a"]).unwrap();
        let mut e1 = LabelEncoder::new();
        let mut e2 = LabelEncoder::new();
        e1.fit(&df, &["c"]).unwrap();
        e2.fit(&df, &["c"]).unwrap();
        assert_eq!(e1.mappings(), e2.mappings());
    }

    #[test]
    fn test_mappings_retained() {
        let df = df!("c" => &["x", "y"]).unwrap();
        let mut encoder = LabelEncoder::new();
        encoder.fit(&df, &["c"]).unwrap();
        let map = encoder.mappings().get("c").unwrap();
        assert_eq!(map.get("x"), Some(&0));
        assert_eq!(map.get("y"), Some(&1));
    }
}

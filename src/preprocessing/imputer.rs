//! Missing-value imputation
//!
//! Numeric columns are filled with their median, textual columns with their
//! most frequent value. Fill values are computed once over all available
//! rows and kept as an explicit per-column map.

use crate::error::{BenchError, Result};
use polars::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum FillValue {
    Median(f64),
    MostFrequent(String),
}

/// Per-column imputer: median for numeric, mode for textual
#[derive(Debug, Clone, Default)]
pub struct ColumnImputer {
    fills: HashMap<String, FillValue>,
    is_fitted: bool,
}

impl ColumnImputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute fill values for the given numeric and textual columns
    pub fn fit(&mut self, df: &DataFrame, numeric: &[&str], textual: &[&str]) -> Result<&mut Self> {
        for name in numeric {
            let series = df
                .column(name)
                .map_err(|_| BenchError::ColumnNotFound(name.to_string()))?
                .as_materialized_series()
                .clone();
            let ca = series.f64().map_err(|e| BenchError::Data(e.to_string()))?;
            let median = ca.median().unwrap_or(0.0);
            self.fills.insert(name.to_string(), FillValue::Median(median));
        }

        for name in textual {
            let series = df
                .column(name)
                .map_err(|_| BenchError::ColumnNotFound(name.to_string()))?
                .as_materialized_series()
                .clone();
            let mode = Self::most_frequent(&series)?;
            self.fills
                .insert(name.to_string(), FillValue::MostFrequent(mode));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill nulls in every fitted column
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(BenchError::NotFitted);
        }

        let mut result = df.clone();
        for (name, fill) in &self.fills {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let series = column.as_materialized_series();
            let filled = match fill {
                FillValue::Median(value) => {
                    let ca = series.f64().map_err(|e| BenchError::Data(e.to_string()))?;
                    let filled: Float64Chunked =
                        ca.into_iter().map(|opt| Some(opt.unwrap_or(*value))).collect();
                    filled.with_name(series.name().clone()).into_series()
                }
                FillValue::MostFrequent(value) => {
                    let ca = series.str().map_err(|e| BenchError::Data(e.to_string()))?;
                    let filled: StringChunked = ca
                        .into_iter()
                        .map(|opt| Some(opt.unwrap_or(value.as_str()).to_string()))
                        .collect();
                    filled.with_name(series.name().clone()).into_series()
                }
            };
            result = result.with_column(filled)?.clone();
        }

        Ok(result)
    }

    pub fn fit_transform(
        &mut self,
        df: &DataFrame,
        numeric: &[&str],
        textual: &[&str],
    ) -> Result<DataFrame> {
        self.fit(df, numeric, textual)?;
        self.transform(df)
    }

    fn most_frequent(series: &Series) -> Result<String> {
        let ca = series.str().map_err(|e| BenchError::Data(e.to_string()))?;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for val in ca.into_iter().flatten() {
            *counts.entry(val).or_insert(0) += 1;
        }
        // Break count ties lexicographically so the fill value is deterministic
        let mode = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(v, _)| v.to_string())
            .unwrap_or_default();
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_median_fill() {
        let df = df!("montant" => &[Some(1.0), None, Some(3.0), Some(100.0)]).unwrap();
        let mut imputer = ColumnImputer::new();
        let result = imputer.fit_transform(&df, &["montant"], &[]).unwrap();

        let ca = result.column("montant").unwrap().f64().unwrap();
        assert_eq!(ca.null_count(), 0);
        assert_eq!(ca.get(1), Some(3.0)); // median of [1, 3, 100]
    }

    #[test]
    fn test_textual_mode_fill() {
        let df = df!(
            "transporteur" => &[Some("dhl"), Some("ups"), None, Some("dhl")]
        )
        .unwrap();
        let mut imputer = ColumnImputer::new();
        let result = imputer.fit_transform(&df, &[], &["transporteur"]).unwrap();

        let ca = result.column("transporteur").unwrap().str().unwrap();
        assert_eq!(ca.null_count(), 0);
        assert_eq!(ca.get(2), Some("dhl"));
    }

    #[test]
    fn test_transform_requires_fit() {
        let df = df!("a" => &[1.0]).unwrap();
        let imputer = ColumnImputer::new();
        assert!(matches!(imputer.transform(&df), Err(BenchError::NotFitted)));
    }

    #[test]
    fn test_unknown_column_is_error() {
        let df = df!("a" => &[1.0]).unwrap();
        let mut imputer = ColumnImputer::new();
        assert!(matches!(
            imputer.fit(&df, &["missing"], &[]),
            Err(BenchError::ColumnNotFound(_))
        ));
    }
}

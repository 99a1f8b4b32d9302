//! Dataset ingestion
//!
//! Loads the tabular source and performs the only fatal validation in the
//! pipeline: a missing or unparsable file aborts the run, since no
//! downstream component can proceed without data.

use crate::config::ColumnSchema;
use crate::error::{BenchError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// CSV ingestor with fail-fast validation
pub struct DataIngestor {
    /// Rows used for schema inference
    infer_schema_rows: usize,
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataIngestor {
    pub fn new() -> Self {
        Self {
            infer_schema_rows: 100,
        }
    }

    /// Load the dataset, failing fast if the source is absent or not tabular
    pub fn load(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(BenchError::Ingestion(format!(
                "input file not found: {}",
                path.display()
            )));
        }

        let file = File::open(path)
            .map_err(|e| BenchError::Ingestion(format!("{}: {}", path.display(), e)))?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_rows))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| BenchError::Ingestion(format!("{}: {}", path.display(), e)))?;

        if df.height() == 0 || df.width() == 0 {
            return Err(BenchError::Ingestion(format!(
                "{}: no tabular data (shape {}x{})",
                path.display(),
                df.height(),
                df.width()
            )));
        }

        info!(rows = df.height(), columns = df.width(), "dataset loaded");
        Ok(df)
    }

    /// Report which well-known schema columns are absent from the frame.
    ///
    /// Absence is not an error here: missing targets trigger the synthetic
    /// fallback later, and every other column is optional.
    pub fn missing_columns(&self, df: &DataFrame, schema: &ColumnSchema) -> Vec<String> {
        let mut expected = vec![
            schema.id.clone(),
            schema.order_date.clone(),
            schema.ship_date.clone(),
            schema.delivery_date.clone(),
            schema.class_target.clone(),
            schema.reg_target.clone(),
        ];
        expected.extend(schema.leakage.iter().cloned());

        let missing: Vec<String> = expected
            .into_iter()
            .filter(|name| df.column(name).is_err())
            .collect();

        if !missing.is_empty() {
            warn!(columns = ?missing, "expected columns absent from dataset");
        }
        missing
    }
}

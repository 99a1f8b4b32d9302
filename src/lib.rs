//! delaybench - delivery-delay model benchmark
//!
//! Loads a delivery-orders CSV, prepares it into a numeric feature
//! matrix, splits it once, then trains and scores a fixed catalogue of
//! classification and regression algorithms on the same partition. The
//! best model per task is flagged and everything is exported as JSON.
//!
//! # Modules
//!
//! - [`config`] - Run configuration and the dataset column schema
//! - [`ingest`] - CSV loading with fail-fast validation
//! - [`preprocessing`] - Calendar features, imputation, encoding, scaling
//! - [`split`] - Seeded train/test partitioning shared by both tasks
//! - [`models`] - Native model implementations behind two small traits
//! - [`evaluation`] - Metrics, the algorithm catalogue and the harness
//! - [`report`] - Result types and JSON export
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod ingest;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod split;

pub use config::{BenchConfig, ColumnSchema};
pub use error::{BenchError, Result};
pub use report::ResultsReport;

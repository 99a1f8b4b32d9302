//! Data preparation pipeline
//!
//! Turns the raw order frame into a fully numeric, imputed, encoded and
//! standardized feature matrix plus the two aligned target vectors.
//! Transform order is fixed: calendar derivation, imputation, label
//! encoding, feature selection, standardization.

mod calendar;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use calendar::{derive_calendar_features, DAY_OF_WEEK_COLUMN, MONTH_COLUMN};
pub use encoder::LabelEncoder;
pub use imputer::ColumnImputer;
pub use pipeline::{PreparedData, Preprocessor};
pub use scaler::StandardScaler;

use polars::prelude::DataType;

/// Whether a polars dtype counts as numeric for feature purposes
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

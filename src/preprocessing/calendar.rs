//! Calendar feature derivation from the order-date column

use crate::error::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Name of the derived month-number column (1..=12)
pub const MONTH_COLUMN: &str = "month";
/// Name of the derived day-of-week column (0 = Monday)
pub const DAY_OF_WEEK_COLUMN: &str = "day_of_week";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a raw date string; unparsable values become `None` ("missing")
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Append `month` and `day_of_week` columns derived from the order-date
/// column. Invalid dates yield nulls, which the imputation step fills later.
/// A frame without the column passes through unchanged.
pub fn derive_calendar_features(df: &DataFrame, order_date_col: &str) -> Result<DataFrame> {
    let column = match df.column(order_date_col) {
        Ok(col) => col,
        Err(_) => return Ok(df.clone()),
    };

    let ca = match column.as_materialized_series().str() {
        Ok(ca) => ca.clone(),
        // Already a non-string dtype; nothing sensible to derive from
        Err(_) => return Ok(df.clone()),
    };

    let dates: Vec<Option<NaiveDate>> = ca.into_iter().map(|opt| opt.and_then(parse_date)).collect();

    let months: Float64Chunked = dates
        .iter()
        .map(|opt| opt.map(|d| d.month() as f64))
        .collect();
    let days_of_week: Float64Chunked = dates
        .iter()
        .map(|opt| opt.map(|d| d.weekday().num_days_from_monday() as f64))
        .collect();

    let mut result = df.clone();
    result = result
        .with_column(months.with_name(MONTH_COLUMN.into()).into_series())?
        .clone();
    result = result
        .with_column(
            days_of_week
                .with_name(DAY_OF_WEEK_COLUMN.into())
                .into_series(),
        )?
        .clone();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derives_month_and_day_of_week() {
        // 2024-01-01 was a Monday
        let df = df!(
            "date_commande" => &["2024-01-01", "2024-06-15"],
            "montant" => &[10.0, 20.0]
        )
        .unwrap();

        let result = derive_calendar_features(&df, "date_commande").unwrap();
        let months = result.column(MONTH_COLUMN).unwrap().f64().unwrap();
        let dows = result.column(DAY_OF_WEEK_COLUMN).unwrap().f64().unwrap();

        assert_eq!(months.get(0), Some(1.0));
        assert_eq!(months.get(1), Some(6.0));
        assert_eq!(dows.get(0), Some(0.0)); // Monday
        assert_eq!(dows.get(1), Some(5.0)); // Saturday
    }

    #[test]
    fn test_invalid_dates_become_null() {
        let df = df!("date_commande" => &["not-a-date", "2024-03-10"]).unwrap();
        let result = derive_calendar_features(&df, "date_commande").unwrap();
        let months = result.column(MONTH_COLUMN).unwrap().f64().unwrap();
        assert_eq!(months.get(0), None);
        assert_eq!(months.get(1), Some(3.0));
    }

    #[test]
    fn test_absent_column_passes_through() {
        let df = df!("montant" => &[1.0, 2.0]).unwrap();
        let result = derive_calendar_features(&df, "date_commande").unwrap();
        assert_eq!(result.width(), 1);
    }

    #[test]
    fn test_datetime_format_accepted() {
        let df = df!("date_commande" => &["2024-02-29 13:45:00"]).unwrap();
        let result = derive_calendar_features(&df, "date_commande").unwrap();
        let months = result.column(MONTH_COLUMN).unwrap().f64().unwrap();
        assert_eq!(months.get(0), Some(2.0));
    }
}

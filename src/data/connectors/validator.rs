use super::types::RequiredColumn;
use crate::error::{BurstPermError, Result};
use polars::prelude::*;

pub struct SchemaValidator;

impl SchemaValidator {
    pub fn has_column(df: &DataFrame, name: &str) -> bool {
        df.get_column_names().iter().any(|col| col.as_str() == name)
    }

    /// Validate that a batch carries every column labeling depends on,
    /// and that each of them is numeric.
    pub fn validate_bursts(df: &DataFrame) -> Result<()> {
        for required in RequiredColumn::all() {
            if !Self::has_column(df, required.as_str()) {
                return Err(BurstPermError::Schema {
                    column: required.as_str().to_string(),
                    remediation: required.remediation().to_string(),
                });
            }

            let series = df.column(required.as_str())?;
            if !matches!(
                series.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(BurstPermError::DataLoading(format!(
                    "Column '{}' must be numeric, found {:?}",
                    required.as_str(),
                    series.dtype()
                )));
            }
        }

        Ok(())
    }

    /// Check for null values across all columns; returns (column, count) pairs.
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let series = df.column(col_name)?;
            let null_count = series.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}

use super::types::BatchPreview;
use super::validator::SchemaValidator;
use crate::error::{BurstPermError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

pub struct CsvConnector;

impl CsvConnector {
    /// Load a burst batch CSV into a DataFrame.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))
            .map_err(|e| {
                BurstPermError::DataLoading(format!(
                    "Failed to open {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .finish()
            .map_err(|e| {
                BurstPermError::DataLoading(format!(
                    "Failed to read {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        let null_report = SchemaValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!(
                "Null values in {}: {:?}",
                path.as_ref().display(),
                null_report
            );
        }

        Ok(df)
    }

    /// Rewrite a batch in place. The file keeps its logical identity; only
    /// the schema grows.
    pub fn write<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| {
                BurstPermError::DataLoading(format!(
                    "Failed to write {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
        Ok(())
    }

    /// Render the first `max_rows` rows of the given columns as strings for
    /// operator verification. Columns absent from the frame are skipped.
    pub fn create_preview(
        df: &DataFrame,
        columns: &[&str],
        max_rows: usize,
    ) -> Result<BatchPreview> {
        let present: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| SchemaValidator::has_column(df, c))
            .collect();

        let num_rows = max_rows.min(df.height());
        let mut rows = Vec::with_capacity(num_rows);

        for i in 0..num_rows {
            let mut row = Vec::with_capacity(present.len());
            for col_name in &present {
                let series = df.column(col_name)?;
                let value = match series.dtype() {
                    DataType::Float64 | DataType::Float32 => {
                        let cast = series.cast(&DataType::Float64)?;
                        let f64_series = cast.f64()?;
                        f64_series
                            .get(i)
                            .map(|v| format!("{:.4}", v))
                            .unwrap_or_else(|| "null".to_string())
                    }
                    DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32 => {
                        let cast = series.cast(&DataType::Int64)?;
                        let i64_series = cast.i64()?;
                        i64_series
                            .get(i)
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "null".to_string())
                    }
                    DataType::String => series.str()?.get(i).unwrap_or("null").to_string(),
                    _ => "?".to_string(),
                };
                row.push(value);
            }
            rows.push(row);
        }

        Ok(BatchPreview {
            columns: present.iter().map(|s| s.to_string()).collect(),
            rows,
        })
    }
}

use super::connectors::{CsvConnector, SchemaValidator};
use crate::error::{BurstPermError, Result};
use crate::types::column;
use polars::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// Per-batch outcome of the discovery pass.
#[derive(Debug, Clone)]
pub enum BatchStatus {
    Loaded { rows: usize },
    Skipped { reason: String },
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub path: String,
    pub status: BatchStatus,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            BatchStatus::Loaded { rows } => write!(f, "Loaded {}: {} bursts", self.path, rows),
            BatchStatus::Skipped { reason } => write!(f, "Skipping {}: {}", self.path, reason),
        }
    }
}

/// Training frame assembled from every qualifying batch, plus the per-batch
/// report for operator output.
#[derive(Debug)]
pub struct Aggregate {
    pub frame: DataFrame,
    pub reports: Vec<BatchReport>,
}

pub struct DatasetAggregator;

impl DatasetAggregator {
    /// Find labeled-batch candidates matching the given glob pattern.
    pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(pattern)
            .map_err(|e| {
                BurstPermError::Configuration(format!("Invalid batch pattern '{}': {}", pattern, e))
            })?
            .filter_map(|entry| entry.ok())
            .collect();
        Ok(paths)
    }

    /// Concatenate all batches that carry a close-time label into one frame,
    /// tagging each row with its source file. Batches lacking the label are
    /// excluded and reported; zero qualifying batches is an error, distinct
    /// from a valid frame that happens to have zero rows.
    pub fn aggregate(paths: &[PathBuf]) -> Result<Aggregate> {
        let mut frames: Vec<LazyFrame> = Vec::new();
        let mut reports = Vec::new();

        for path in paths {
            match Self::load_batch(path) {
                Ok(Some(df)) => {
                    reports.push(BatchReport {
                        path: path.display().to_string(),
                        status: BatchStatus::Loaded { rows: df.height() },
                    });
                    frames.push(df.lazy());
                }
                Ok(None) => {
                    reports.push(BatchReport {
                        path: path.display().to_string(),
                        status: BatchStatus::Skipped {
                            reason: format!("no {} column", column::PERM_CLOSE),
                        },
                    });
                }
                Err(e) => {
                    reports.push(BatchReport {
                        path: path.display().to_string(),
                        status: BatchStatus::Skipped {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        if frames.is_empty() {
            let detail: Vec<String> = reports.iter().map(|r| r.to_string()).collect();
            return Err(BurstPermError::EmptyInput(format!(
                "none of {} candidate batch(es) carry {} ({})",
                paths.len(),
                column::PERM_CLOSE,
                if detail.is_empty() {
                    "no files matched".to_string()
                } else {
                    detail.join("; ")
                }
            )));
        }

        // Batches may disagree on optional horizon columns; a diagonal
        // union reconciles the schemas, filling absent columns with nulls.
        let frame = concat(
            frames,
            UnionArgs {
                diagonal: true,
                to_supertypes: true,
                ..Default::default()
            },
        )?
        .collect()?;

        Ok(Aggregate { frame, reports })
    }

    /// Load one batch; `None` means it lacks the close-time label.
    fn load_batch(path: &Path) -> Result<Option<DataFrame>> {
        let mut df = CsvConnector::load(path)?;

        if !SchemaValidator::has_column(&df, column::PERM_CLOSE) {
            return Ok(None);
        }

        let source = vec![path.display().to_string(); df.height()];
        df.with_column(Series::new(column::SOURCE.into(), source))?;

        Ok(Some(df))
    }
}

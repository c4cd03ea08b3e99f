use crate::config::TrainerConfig;
use crate::error::{BurstPermError, Result};
use crate::ml::features::FeatureEngineer;
use crate::ml::models::{GbmParams, ModelMetrics, PermanenceModel};
use crate::types::{column, FEATURE_COLUMNS};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;

/// Deterministic shuffle split: same `n`, fraction, and seed always yield
/// the same membership. Returns (train, test) index sets.
pub fn split_indices(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = ((n as f64) * test_fraction).ceil() as usize;
    let test_size = test_size.min(n);

    let test = indices[..test_size].to_vec();
    let train = indices[test_size..].to_vec();
    (train, test)
}

/// Everything the training entry point prints, plus the artifact location.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub run_at: DateTime<Utc>,
    pub total_samples: usize,
    pub features: Vec<String>,
    pub train_size: usize,
    pub test_size: usize,
    pub metrics: ModelMetrics,
    pub importances: Vec<(String, f64)>,
    pub model_path: String,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total samples: {}", self.total_samples)?;
        writeln!(f, "Features: {:?}", self.features)?;
        writeln!(f, "Target: {}", column::PERM_CLOSE)?;
        writeln!(f)?;
        writeln!(f, "Train size: {}, Test size: {}", self.train_size, self.test_size)?;
        writeln!(f, "Test MSE:  {:.4}", self.metrics.mse)?;
        writeln!(f, "Test RMSE: {:.4}", self.metrics.rmse)?;
        writeln!(f, "Test MAE:  {:.4}", self.metrics.mae)?;
        writeln!(f, "Test R2:   {:.4}", self.metrics.r2)?;
        writeln!(
            f,
            "Direction Accuracy (persist vs revert): {:.2}%",
            self.metrics.directional_accuracy * 100.0
        )?;
        writeln!(f)?;
        writeln!(f, "Feature Importances:")?;
        for (feature, importance) in &self.importances {
            writeln!(f, "  {}: {:.4}", feature, importance)?;
        }
        writeln!(f)?;
        write!(f, "Model saved to {}", self.model_path)
    }
}

pub struct TrainingOutput {
    pub model: PermanenceModel,
    pub report: TrainingReport,
}

/// Fits and scores the permanence regression ensemble on an aggregated,
/// labeled training frame.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Full train/evaluate pass: engineer features, filter, split, fit,
    /// score, rank importances, persist the artifact.
    pub fn train(&self, frame: &DataFrame) -> Result<TrainingOutput> {
        let run_at = Utc::now();
        log::info!("Training run started at {}", run_at);

        let engineered = FeatureEngineer::new().engineer(frame)?;
        let (x, y) = self.training_rows(&engineered)?;

        let n = x.len();
        if n == 0 {
            return Err(BurstPermError::EmptyInput(format!(
                "no rows survived target filtering (undefined {} or |target| >= {})",
                column::PERM_CLOSE,
                self.config.outlier_threshold
            )));
        }

        let (train_idx, test_idx) = split_indices(n, self.config.test_fraction, self.config.seed);
        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(BurstPermError::EmptyInput(format!(
                "insufficient data for an {}% holdout split: {} usable rows",
                (self.config.test_fraction * 100.0).round(),
                n
            )));
        }

        let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
        let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
        let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
        let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

        let feature_names: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        let params = GbmParams {
            n_estimators: self.config.n_estimators,
            max_depth: self.config.max_depth,
            learning_rate: self.config.learning_rate,
        };

        let model = PermanenceModel::fit(params, &feature_names, &x_train, &y_train)?;
        let metrics = model.evaluate(&x_test, &y_test)?;
        let importances = model.feature_importances(&x_test, &y_test, self.config.seed)?;

        model.save(&self.config.model_path)?;

        let report = TrainingReport {
            run_at,
            total_samples: n,
            features: feature_names,
            train_size: train_idx.len(),
            test_size: test_idx.len(),
            metrics,
            importances,
            model_path: self.config.model_path.clone(),
        };

        Ok(TrainingOutput { model, report })
    }

    /// Extract the fixed feature matrix and target vector, dropping rows
    /// with an undefined target, an outlier target, a missing feature, or a
    /// negative duration (upstream corruption).
    fn training_rows(&self, df: &DataFrame) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
        let target = df.column(column::PERM_CLOSE)?.cast(&DataType::Float64)?;
        let target = target.f64()?;

        let mut feature_cols = Vec::with_capacity(FEATURE_COLUMNS.len());
        for name in FEATURE_COLUMNS {
            let cast = df.column(name)?.cast(&DataType::Float64)?;
            feature_cols.push(cast.f64()?.clone());
        }

        let duration_idx = FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column::DURATION)
            .expect("Duration is a fixed feature");

        let mut x = Vec::new();
        let mut y = Vec::new();

        for i in 0..df.height() {
            let t = match target.get(i) {
                Some(t) if t.is_finite() && t.abs() < self.config.outlier_threshold => t,
                _ => continue,
            };

            let mut row = Vec::with_capacity(FEATURE_COLUMNS.len());
            let mut valid = true;
            for col in &feature_cols {
                match col.get(i) {
                    Some(v) if v.is_finite() => row.push(v),
                    _ => {
                        valid = false;
                        break;
                    }
                }
            }
            if !valid || row[duration_idx] < 0.0 {
                continue;
            }

            x.push(row);
            y.push(t);
        }

        Ok((x, y))
    }
}

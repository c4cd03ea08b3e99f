use crate::error::{BurstPermError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Training-run configuration. Defaults reproduce the reference pipeline
/// exactly; a TOML file may override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of boosting stages.
    pub n_estimators: usize,
    /// Maximum depth of each regression tree.
    pub max_depth: u32,
    /// Shrinkage applied to each stage.
    pub learning_rate: f64,
    /// Seed shared by the train/test split and importance permutation.
    pub seed: u64,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Rows with |Perm_tCLOSE| at or above this value are discarded.
    pub outlier_threshold: f64,
    /// Destination of the fitted-model artifact.
    pub model_path: String,
    /// Glob pattern used to discover labeled batch files.
    pub batch_pattern: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 4,
            learning_rate: 0.1,
            seed: 42,
            test_fraction: 0.2,
            outlier_threshold: 1000.0,
            model_path: "permanence_model.json".to_string(),
            batch_pattern: "bursts_*.csv".to_string(),
        }
    }
}

impl TrainerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| BurstPermError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: TrainerConfig = toml::from_str(&contents)
            .map_err(|e| BurstPermError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(BurstPermError::Configuration(
                "n_estimators must be positive".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(BurstPermError::Configuration(
                "max_depth must be positive".to_string(),
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(BurstPermError::Configuration(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.outlier_threshold <= 0.0 {
            return Err(BurstPermError::Configuration(
                "outlier_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

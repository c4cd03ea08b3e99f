use crate::error::{BurstPermError, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Boosting hyperparameters. Sampling ratios are pinned at 1.0 inside
/// `PermanenceModel::fit` so training is deterministic given the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmParams {
    /// Number of boosting stages.
    pub n_estimators: usize,
    /// Maximum depth of each tree.
    pub max_depth: u32,
    /// Shrinkage applied to each stage.
    pub learning_rate: f64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 4,
            learning_rate: 0.1,
        }
    }
}

/// Regression and sign-agreement metrics on a held-out split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    /// Fraction of rows where prediction and target agree on
    /// persisted (> 0) vs reverted (<= 0). Always in [0, 1].
    pub directional_accuracy: f64,
}

impl ModelMetrics {
    pub fn regression(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        let n = y_true.len();
        if n == 0 || n != y_pred.len() {
            return Err(BurstPermError::Computation(format!(
                "metric inputs must be non-empty and equal length ({} vs {})",
                n,
                y_pred.len()
            )));
        }

        let mse: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / n as f64;

        let mae: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).abs())
            .sum::<f64>()
            / n as f64;

        let mean_true: f64 = y_true.iter().sum::<f64>() / n as f64;
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true).powi(2)).sum();
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        let r2 = if ss_tot != 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        let matches = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (**t > 0.0) == (**p > 0.0))
            .count();
        let directional_accuracy = matches as f64 / n as f64;

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
            directional_accuracy,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactMeta {
    feature_names: Vec<String>,
    params: GbmParams,
}

/// Gradient-boosted regression ensemble predicting `Perm_tCLOSE`.
pub struct PermanenceModel {
    model: GBDT,
    feature_names: Vec<String>,
    params: GbmParams,
}

impl PermanenceModel {
    /// Fit on a feature matrix (row-major) and targets.
    pub fn fit(
        params: GbmParams,
        feature_names: &[String],
        x: &[Vec<f64>],
        y: &[f64],
    ) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(BurstPermError::EmptyInput(format!(
                "cannot fit on {} rows with {} targets",
                x.len(),
                y.len()
            )));
        }

        let mut config = Config::new();
        config.set_feature_size(feature_names.len());
        config.set_max_depth(params.max_depth);
        config.set_iterations(params.n_estimators);
        config.set_shrinkage(params.learning_rate as ValueType);
        config.set_loss("SquaredError");
        // Full sampling keeps the fit deterministic for identical input.
        config.set_data_sample_ratio(1.0);
        config.set_feature_sample_ratio(1.0);
        config.set_training_optimization_level(2);
        config.set_debug(false);

        let mut training: DataVec = x
            .iter()
            .zip(y.iter())
            .map(|(features, target)| {
                let features: Vec<ValueType> =
                    features.iter().map(|v| *v as ValueType).collect();
                Data::new_training_data(features, 1.0, *target as ValueType, None)
            })
            .collect();

        log::info!(
            "Fitting boosted ensemble: {} rows, {} features, {} stages, depth {}",
            x.len(),
            feature_names.len(),
            params.n_estimators,
            params.max_depth
        );

        let mut model = GBDT::new(&config);
        model.fit(&mut training);

        Ok(Self {
            model,
            feature_names: feature_names.to_vec(),
            params,
        })
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let test: DataVec = x
            .iter()
            .map(|features| {
                let features: Vec<ValueType> =
                    features.iter().map(|v| *v as ValueType).collect();
                Data::new_test_data(features, None)
            })
            .collect();

        let predictions = self.model.predict(&test);
        Ok(predictions.into_iter().map(|p| p as f64).collect())
    }

    pub fn evaluate(&self, x: &[Vec<f64>], y: &[f64]) -> Result<ModelMetrics> {
        let predictions = self.predict(x)?;
        ModelMetrics::regression(y, &predictions)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Per-feature importances by seeded permutation on held-out data:
    /// shuffle one feature column at a time and measure the MSE increase.
    /// Scores are clamped at zero and normalized to sum to 1, returned in
    /// descending order.
    pub fn feature_importances(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        seed: u64,
    ) -> Result<Vec<(String, f64)>> {
        let base = self.evaluate(x, y)?.mse;
        let n_features = self.feature_names.len();

        let mut raw = Vec::with_capacity(n_features);
        for feature_idx in 0..n_features {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(feature_idx as u64));
            let mut shuffled: Vec<f64> = x.iter().map(|row| row[feature_idx]).collect();
            shuffled.shuffle(&mut rng);

            let permuted: Vec<Vec<f64>> = x
                .iter()
                .zip(shuffled.iter())
                .map(|(row, value)| {
                    let mut row = row.clone();
                    row[feature_idx] = *value;
                    row
                })
                .collect();

            let permuted_mse = self.evaluate(&permuted, y)?.mse;
            raw.push((permuted_mse - base).max(0.0));
        }

        let total: f64 = raw.iter().sum();
        let scores: Vec<f64> = if total > 0.0 {
            raw.iter().map(|v| v / total).collect()
        } else {
            // Nothing moved the error; report a flat profile.
            vec![1.0 / n_features as f64; n_features]
        };

        let mut importances: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(scores)
            .collect();
        importances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(importances)
    }

    /// Persist the fitted ensemble plus a metadata sidecar recording the
    /// feature contract.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        self.model
            .save_model(&path_str)
            .map_err(|e| BurstPermError::Model(format!("Failed to save model to {}: {}", path_str, e)))?;

        let meta = ArtifactMeta {
            feature_names: self.feature_names.clone(),
            params: self.params.clone(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(Self::meta_path(&path_str), meta_json)?;

        Ok(())
    }

    /// Restore a persisted model; the metadata sidecar re-establishes the
    /// feature contract the predictor was trained against.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let model = GBDT::load_model(&path_str).map_err(|e| {
            BurstPermError::Model(format!("Failed to load model from {}: {}", path_str, e))
        })?;

        let meta_contents = std::fs::read_to_string(Self::meta_path(&path_str))?;
        let meta: ArtifactMeta = serde_json::from_str(&meta_contents)?;

        Ok(Self {
            model,
            feature_names: meta.feature_names,
            params: meta.params,
        })
    }

    fn meta_path(path: &str) -> String {
        format!("{}.meta", path)
    }
}

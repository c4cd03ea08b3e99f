mod gbm;

pub use gbm::{GbmParams, ModelMetrics, PermanenceModel};

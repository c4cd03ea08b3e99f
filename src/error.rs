use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurstPermError {
    #[error("Missing required column '{column}'. {remediation}")]
    Schema { column: String, remediation: String },

    #[error("No usable data: {0}")]
    EmptyInput(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BurstPermError>;

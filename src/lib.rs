pub mod config;
pub mod data;
pub mod error;
pub mod ml;
pub mod types;

pub use error::{BurstPermError, Result};

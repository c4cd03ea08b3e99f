pub mod aggregator;
pub mod connectors;

pub use aggregator::{Aggregate, BatchReport, BatchStatus, DatasetAggregator};
pub use connectors::{BatchPreview, CsvConnector, RequiredColumn, SchemaValidator};

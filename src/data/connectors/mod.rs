mod csv;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use types::{BatchPreview, RequiredColumn};
pub use validator::SchemaValidator;

mod engineer;

pub use engineer::FeatureEngineer;

pub mod features;
pub mod labeling;
pub mod models;
pub mod training;

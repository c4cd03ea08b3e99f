mod trainer;

pub use trainer::{split_indices, Trainer, TrainingOutput, TrainingReport};

mod permanence;

pub use permanence::{permanence, AugmentOutcome, LabelAugmenter};

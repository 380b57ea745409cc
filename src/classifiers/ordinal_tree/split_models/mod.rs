mod binary_split;
mod no_split;
mod split_model;

pub use binary_split::{BinarySplit, SplitPoint, SplitSettings};
pub use no_split::NoSplit;
pub use split_model::SplitModel;

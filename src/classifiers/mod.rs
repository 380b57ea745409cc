pub mod classifier;
pub mod error;
pub mod ordinal_tree;

pub use classifier::Classifier;
pub use error::ClassifierError;
pub use ordinal_tree::OrdinalTree;

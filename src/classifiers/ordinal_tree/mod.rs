pub mod distribution;
pub mod model_selection;
pub mod nodes;
pub mod optimization_criterion;
pub mod options;
mod ordinal_tree;
pub mod pruning;
pub mod split_criteria;
pub mod split_models;

pub use optimization_criterion::OptimizationCriterion;
pub use options::{AttributeSampling, OrdinalTreeOptions, PruningStrategy};
pub use ordinal_tree::OrdinalTree;

mod c45_pruning;
mod reduced_error_pruning;

pub use c45_pruning::estimated_errors_for_distribution;
pub use reduced_error_pruning::holdout_split;

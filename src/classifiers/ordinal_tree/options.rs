use crate::classifiers::ordinal_tree::optimization_criterion::OptimizationCriterion;
use crate::utils::math::log2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PruningStrategy {
    Unpruned,
    /// C4.5 pessimistic pruning.
    Confidence {
        confidence_factor: f64,
        subtree_raising: bool,
    },
    /// Prune against a hold-out fold.
    ReducedError { num_folds: usize },
}

impl PruningStrategy {
    pub fn is_pruned(&self) -> bool {
        !matches!(self, PruningStrategy::Unpruned)
    }
}

/// How many attributes each node draws before favouring one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSampling {
    All,
    Log2,
    Fixed(usize),
}

impl AttributeSampling {
    /// Sample size for a source schema with `num_attributes` columns, class included.
    pub fn resolve(&self, num_attributes: usize) -> usize {
        let wanted = match self {
            AttributeSampling::All => num_attributes,
            AttributeSampling::Log2 => log2(num_attributes as f64).floor() as usize + 1,
            AttributeSampling::Fixed(k) => *k,
        };
        wanted.min(num_attributes.saturating_sub(1))
    }
}

/// Validated settings of an [`OrdinalTree`](crate::classifiers::ordinal_tree::OrdinalTree).
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalTreeOptions {
    pub min_num_obj: usize,
    pub use_mdl_correction: bool,
    pub use_laplace: bool,
    pub collapse_tree: bool,
    pub pruning: PruningStrategy,
    pub save_instance_data: bool,
    pub seed: u64,
    /// Half-width of the label window each replica keeps; 0 keeps every row.
    pub data_rep_s: usize,
    pub optimization_criterion: OptimizationCriterion,
    /// Report Frank–Hall class probabilities instead of a one-hot vote.
    pub frank_hall_distribution: bool,
    pub attribute_sampling: AttributeSampling,
    pub max_depth: Option<usize>,
}

impl Default for OrdinalTreeOptions {
    fn default() -> Self {
        Self {
            min_num_obj: 2,
            use_mdl_correction: true,
            use_laplace: false,
            collapse_tree: true,
            pruning: PruningStrategy::Confidence {
                confidence_factor: 0.25,
                subtree_raising: true,
            },
            save_instance_data: false,
            seed: 1,
            data_rep_s: 0,
            optimization_criterion: OptimizationCriterion::Sum,
            frank_hall_distribution: false,
            attribute_sampling: AttributeSampling::All,
            max_depth: None,
        }
    }
}

use crate::classifiers::ordinal_tree::OptimizationCriterion;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

fn default_min_num_obj() -> usize {
    2
}
fn default_use_mdl_correction() -> bool {
    true
}
fn default_collapse_tree() -> bool {
    true
}
fn default_subtree_raising() -> bool {
    true
}
fn default_seed() -> u64 {
    1
}
fn default_fixed_sample_size() -> usize {
    1
}

pub(crate) const DEFAULT_CONFIDENCE_FACTOR: f64 = 0.25;
pub(crate) const DEFAULT_NUM_FOLDS: usize = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NoParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FixedSamplingParams {
    #[serde(default = "default_fixed_sample_size")]
    #[schemars(
        title = "Attributes per node",
        description = "Attributes drawn at every node; capped at the non-class attribute count.",
        default = "default_fixed_sample_size"
    )]
    pub count: usize,
}
impl Default for FixedSamplingParams {
    fn default() -> Self {
        Self {
            count: default_fixed_sample_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(AttributeSamplingKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum AttributeSamplingChoice {
    #[strum_discriminants(strum(
        message = "All attributes",
        detailed_message = "Every attribute competes at every node."
    ))]
    All(NoParams),
    #[serde(rename = "log2")]
    #[strum_discriminants(strum(
        serialize = "log2",
        message = "Log2 attributes",
        detailed_message = "Draw floor(log2(attributes)) + 1 attributes per node."
    ))]
    Log2(NoParams),
    #[strum_discriminants(strum(
        message = "Fixed count",
        detailed_message = "Draw a fixed number of attributes per node."
    ))]
    Fixed(FixedSamplingParams),
}
impl Default for AttributeSamplingChoice {
    fn default() -> Self {
        Self::All(NoParams::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(CriterionKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum CriterionChoice {
    #[strum_discriminants(strum(
        message = "Sum",
        detailed_message = "Active replica scores summed over every replica."
    ))]
    Sum(NoParams),
    #[strum_discriminants(strum(
        message = "Average",
        detailed_message = "Mean of the active replica scores."
    ))]
    Average(NoParams),
    #[strum_discriminants(strum(
        message = "Product",
        detailed_message = "Probabilistic OR of the active replica scores."
    ))]
    Product(NoParams),
    #[strum_discriminants(strum(
        message = "Geometric mean",
        detailed_message = "n-th root of the product of the active replica scores."
    ))]
    GeometricMean(NoParams),
    #[strum_discriminants(strum(message = "Min", detailed_message = "Smallest active replica score."))]
    Min(NoParams),
    #[strum_discriminants(strum(message = "Max", detailed_message = "Largest active replica score."))]
    Max(NoParams),
    #[strum_discriminants(strum(
        message = "Euclidean min",
        detailed_message = "Distance of the active scores from the origin."
    ))]
    EuclideanMin(NoParams),
    #[strum_discriminants(strum(
        message = "Euclidean max",
        detailed_message = "Closeness of the active scores to the all-ones corner."
    ))]
    EuclideanMax(NoParams),
}
impl Default for CriterionChoice {
    fn default() -> Self {
        Self::Sum(NoParams::default())
    }
}

impl From<&CriterionChoice> for OptimizationCriterion {
    fn from(choice: &CriterionChoice) -> Self {
        match choice {
            CriterionChoice::Sum(_) => OptimizationCriterion::Sum,
            CriterionChoice::Average(_) => OptimizationCriterion::Average,
            CriterionChoice::Product(_) => OptimizationCriterion::Product,
            CriterionChoice::GeometricMean(_) => OptimizationCriterion::GeometricMean,
            CriterionChoice::Min(_) => OptimizationCriterion::Min,
            CriterionChoice::Max(_) => OptimizationCriterion::Max,
            CriterionChoice::EuclideanMin(_) => OptimizationCriterion::EuclideanMin,
            CriterionChoice::EuclideanMax(_) => OptimizationCriterion::EuclideanMax,
        }
    }
}

/// User-facing parameters of the ordinal tree, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OrdinalTreeParams {
    #[serde(default = "default_min_num_obj")]
    #[schemars(
        title = "Minimum instances per leaf",
        description = "Smallest weight either side of a split may hold.",
        default = "default_min_num_obj"
    )]
    pub min_num_obj: usize,

    #[serde(default = "default_use_mdl_correction")]
    #[schemars(
        title = "MDL correction",
        description = "Penalise numeric splits by the number of candidate cuts.",
        default = "default_use_mdl_correction"
    )]
    pub use_mdl_correction: bool,

    #[serde(default)]
    #[schemars(
        title = "Laplace smoothing",
        description = "Smooth leaf probabilities with the Laplace correction."
    )]
    pub use_laplace: bool,

    #[serde(default)]
    #[schemars(title = "Unpruned", description = "Skip pruning entirely.")]
    pub unpruned: bool,

    #[serde(default = "default_collapse_tree")]
    #[schemars(
        title = "Collapse tree",
        description = "Remove subtrees that do not reduce training error.",
        default = "default_collapse_tree"
    )]
    pub collapse_tree: bool,

    #[serde(default)]
    #[schemars(
        title = "Confidence factor",
        description = "Confidence used by pessimistic pruning (0–1); 0.25 when unset."
    )]
    pub confidence_factor: Option<f64>,

    #[serde(default = "default_subtree_raising")]
    #[schemars(
        title = "Subtree raising",
        description = "Consider replacing a node by its largest branch while pruning.",
        default = "default_subtree_raising"
    )]
    pub subtree_raising: bool,

    #[serde(default)]
    #[schemars(
        title = "Reduced-error pruning",
        description = "Prune against a held-out fold instead of pessimistic estimates."
    )]
    pub reduced_error_pruning: bool,

    #[serde(default)]
    #[schemars(
        title = "Number of folds",
        description = "Folds for reduced-error pruning, one of which is held out; 3 when unset."
    )]
    pub num_folds: Option<usize>,

    #[serde(default)]
    #[schemars(
        title = "Save instance data",
        description = "Keep the training rows at every node after building."
    )]
    pub save_instance_data: bool,

    #[serde(default = "default_seed")]
    #[schemars(
        title = "Seed",
        description = "Seed for attribute sampling and fold assignment.",
        default = "default_seed"
    )]
    pub seed: u64,

    #[serde(default)]
    #[schemars(
        title = "Replication window",
        description = "Replica i keeps only labels within i ± s; 0 keeps every row."
    )]
    pub data_rep_s: usize,

    #[serde(default)]
    #[schemars(skip)]
    pub optimization_criterion: CriterionChoice,

    #[serde(default)]
    #[schemars(
        title = "Frank–Hall distribution",
        description = "Report decoded replica probabilities instead of a one-hot vote."
    )]
    pub frank_hall_distribution: bool,

    #[serde(default)]
    #[schemars(skip)]
    pub attribute_sampling: AttributeSamplingChoice,

    #[serde(default)]
    #[schemars(
        title = "Maximum depth",
        description = "Depth limit of the tree; unlimited when unset."
    )]
    pub max_depth: Option<usize>,
}
impl Default for OrdinalTreeParams {
    fn default() -> Self {
        Self {
            min_num_obj: default_min_num_obj(),
            use_mdl_correction: default_use_mdl_correction(),
            use_laplace: false,
            unpruned: false,
            collapse_tree: default_collapse_tree(),
            confidence_factor: None,
            subtree_raising: default_subtree_raising(),
            reduced_error_pruning: false,
            num_folds: None,
            save_instance_data: false,
            seed: default_seed(),
            data_rep_s: 0,
            optimization_criterion: CriterionChoice::default(),
            frank_hall_distribution: false,
            attribute_sampling: AttributeSamplingChoice::default(),
            max_depth: None,
        }
    }
}

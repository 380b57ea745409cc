use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::split_models::SplitModel;
use crate::core::dataset::Dataset;

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub(crate) model: SplitModel,
    pub(crate) children: Vec<NodeId>,
    /// Set on leaves that received no training weight.
    pub(crate) is_empty: bool,
    /// Rows that reached this node, kept while pruning needs them.
    pub(crate) train: Option<Dataset>,
    /// Per-replica hold-out counts used by reduced-error pruning.
    pub(crate) test: Option<Vec<Distribution>>,
}

impl TreeNode {
    pub fn new(model: SplitModel) -> Self {
        Self {
            model,
            children: Vec::new(),
            is_empty: false,
            train: None,
            test: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn model(&self) -> &SplitModel {
        &self.model
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Drops the children and keeps the node's counts folded into one bag.
    pub(crate) fn make_leaf(&mut self) {
        self.children.clear();
        let distributions = self.model.merged_distributions();
        self.model = SplitModel::no_split(distributions);
    }
}

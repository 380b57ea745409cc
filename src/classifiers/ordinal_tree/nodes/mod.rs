mod classifier_tree;
mod tree_node;

pub use classifier_tree::{ClassifierTree, GrowOptions};
pub use tree_node::{NodeId, TreeNode};

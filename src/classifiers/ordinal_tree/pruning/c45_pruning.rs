use crate::classifiers::ClassifierError;
use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::nodes::{ClassifierTree, NodeId};
use crate::core::dataset::Dataset;
use crate::replication::split_replicas;
use crate::utils::math::{eq, gr, sm_or_eq};
use crate::utils::stats::add_errs;
use tracing::debug;

/// Pessimistic error count of one distribution at confidence `cf`.
pub fn estimated_errors_for_distribution(dist: &Distribution, cf: f64) -> f64 {
    if eq(dist.total(), 0.0) {
        return 0.0;
    }
    let wrong = dist.num_incorrect();
    wrong + add_errs(dist.total(), wrong, cf)
}

fn estimated_errors_for_all(distributions: &[Distribution], cf: f64) -> f64 {
    distributions
        .iter()
        .map(|d| estimated_errors_for_distribution(d, cf))
        .sum()
}

impl ClassifierTree {
    /// Turns every subtree that does not beat its own root on training
    /// errors into a leaf.
    pub fn collapse(&mut self) {
        self.collapse_node(self.root);
    }

    fn collapse_node(&mut self, id: NodeId) {
        if self.nodes[id].is_leaf() {
            return;
        }
        let errors_of_subtree = self.training_errors(id);
        let errors_of_node: f64 = self.nodes[id]
            .model
            .distributions()
            .iter()
            .map(Distribution::num_incorrect)
            .sum();
        if errors_of_subtree >= errors_of_node - 1e-3 {
            debug!(node = id, errors_of_subtree, errors_of_node, "collapsed subtree");
            self.nodes[id].make_leaf();
        } else {
            for child in self.nodes[id].children.clone() {
                self.collapse_node(child);
            }
        }
    }

    fn training_errors(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        if node.is_leaf() {
            node.model
                .distributions()
                .iter()
                .map(Distribution::num_incorrect)
                .sum()
        } else {
            node.children.iter().map(|&c| self.training_errors(c)).sum()
        }
    }

    /// C4.5 pessimistic pruning with optional subtree raising. Raising needs
    /// the training rows kept at every node.
    pub fn prune(&mut self, cf: f64, subtree_raising: bool) -> Result<(), ClassifierError> {
        self.prune_node(self.root, cf, subtree_raising)
    }

    fn prune_node(&mut self, id: NodeId, cf: f64, subtree_raising: bool) -> Result<(), ClassifierError> {
        if self.nodes[id].is_leaf() {
            return Ok(());
        }
        for child in self.nodes[id].children.clone() {
            self.prune_node(child, cf, subtree_raising)?;
        }

        let node = &self.nodes[id];
        let largest = largest_branch(node.model.distributions(), node.children.len())
            .and_then(|bag| node.children.get(bag).copied());
        let errors_largest_branch = match (subtree_raising, largest, node.train.as_ref()) {
            (true, Some(branch), Some(train)) => self.estimated_errors_for_branch(branch, train, cf)?,
            _ => f64::MAX,
        };
        let errors_leaf = estimated_errors_for_all(node.model.distributions(), cf);
        let errors_tree = self.estimated_errors(id, cf);

        if sm_or_eq(errors_leaf, errors_tree + 0.1) && sm_or_eq(errors_leaf, errors_largest_branch + 0.1) {
            debug!(node = id, errors_leaf, errors_tree, "pruned to leaf");
            self.nodes[id].make_leaf();
            return Ok(());
        }

        if let Some(branch) = largest.filter(|_| sm_or_eq(errors_largest_branch, errors_tree + 0.1)) {
            debug!(node = id, branch, errors_largest_branch, errors_tree, "raised largest branch");
            self.graft(id, branch);
            if let Some(train) = self.nodes[id].train.take() {
                self.new_distribution(id, train)?;
            }
            self.prune_node(id, cf, subtree_raising)?;
        }
        Ok(())
    }

    /// Replaces node `id` by its child `branch`, detaching the siblings.
    fn graft(&mut self, id: NodeId, branch: NodeId) {
        let child = &mut self.nodes[branch];
        let model = child.model.clone();
        let children = std::mem::take(&mut child.children);
        let node = &mut self.nodes[id];
        node.model = model;
        node.children = children;
    }

    fn estimated_errors(&self, id: NodeId, cf: f64) -> f64 {
        let node = &self.nodes[id];
        if node.is_leaf() {
            estimated_errors_for_all(node.model.distributions(), cf)
        } else {
            node.children.iter().map(|&c| self.estimated_errors(c, cf)).sum()
        }
    }

    /// Pessimistic errors of the subtree at `id` when `data` is routed through it.
    fn estimated_errors_for_branch(&self, id: NodeId, data: &Dataset, cf: f64) -> Result<f64, ClassifierError> {
        let node = &self.nodes[id];
        if node.is_leaf() {
            return Ok(split_replicas(data)
                .iter()
                .map(|replica| {
                    let dist = Distribution::from_instances(replica.iter(), replica.num_classes());
                    estimated_errors_for_distribution(&dist, cf)
                })
                .sum());
        }

        let mut model = node.model.clone();
        model.reset_distributions(data);
        let parts = model.split(data)?;
        let mut errors = 0.0;
        for (&child, part) in node.children.iter().zip(&parts) {
            errors += self.estimated_errors_for_branch(child, part, cf)?;
        }
        Ok(errors)
    }

    /// Recounts the distributions of the subtree at `id` from `data`, which
    /// becomes the subtree's stored training rows.
    pub(crate) fn new_distribution(&mut self, id: NodeId, data: Dataset) -> Result<(), ClassifierError> {
        self.nodes[id].model.reset_distributions(&data);
        if self.nodes[id].is_leaf() {
            if !eq(data.sum_of_weights(), 0.0) {
                self.nodes[id].is_empty = false;
            }
        } else {
            let parts = self.nodes[id].model.split(&data)?;
            for (child, part) in self.nodes[id].children.clone().into_iter().zip(parts) {
                self.new_distribution(child, part)?;
            }
        }
        self.nodes[id].train = Some(data);
        Ok(())
    }
}

/// Subset holding the most weight summed over replicas.
fn largest_branch(distributions: &[Distribution], num_subsets: usize) -> Option<usize> {
    let mut best = None;
    let mut best_weight = 0.0;
    for bag in 0..num_subsets {
        let weight: f64 = distributions
            .iter()
            .filter(|d| bag < d.num_bags())
            .map(|d| d.per_bag(bag))
            .sum();
        if gr(weight, best_weight) {
            best = Some(bag);
            best_weight = weight;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::ordinal_tree::model_selection::ModelSelection;
    use crate::classifiers::ordinal_tree::nodes::GrowOptions;
    use crate::classifiers::ordinal_tree::optimization_criterion::OptimizationCriterion;
    use crate::classifiers::ordinal_tree::split_models::SplitSettings;
    use crate::replication::replicate_data;
    use crate::testing::dummies::{banded_dataset, header_single_numeric};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn grow(data: &Dataset, min_no_obj: f64) -> ClassifierTree {
        let settings = SplitSettings {
            min_no_obj,
            use_mdl_correction: true,
            criterion: OptimizationCriterion::Sum,
        };
        let selection = ModelSelection::new(settings, usize::MAX, data);
        let mut rng = StdRng::seed_from_u64(1);
        let options = GrowOptions {
            max_depth: None,
            keep_data: true,
        };
        ClassifierTree::grow(&selection, data.clone(), None, options, &mut rng).unwrap()
    }

    /// Banded classes with every fifth label shuffled to the next band.
    fn noisy_bands(per_class: usize) -> Dataset {
        let mut data = Dataset::new(header_single_numeric(3));
        for class in 0..3usize {
            for i in 0..per_class {
                let x = class as f64 + 0.05 + 0.9 * (i as f64) / (per_class as f64);
                let label = if i % 5 == 0 { (class + 1) % 3 } else { class };
                data.push_values(vec![x, label as f64], 1.0).unwrap();
            }
        }
        data
    }

    #[test]
    fn empty_distribution_has_no_estimated_errors() {
        let dist = Distribution::new(1, 2);
        assert_eq!(estimated_errors_for_distribution(&dist, 0.25), 0.0);
    }

    #[test]
    fn estimated_errors_exceed_observed_errors() {
        let data = replicate_data(&noisy_bands(20), 0, None).unwrap();
        let dist = Distribution::from_instances(data.iter(), 2);
        let estimate = estimated_errors_for_distribution(&dist, 0.25);
        assert!(estimate > dist.num_incorrect());
    }

    #[test]
    fn clean_split_survives_pruning() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let mut tree = grow(&data, 2.0);
        tree.collapse();
        tree.prune(0.25, true).unwrap();
        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.num_leaves(), 2);
    }

    #[test]
    fn pruning_never_grows_the_tree() {
        let data = replicate_data(&noisy_bands(40), 0, None).unwrap();
        for raising in [false, true] {
            let mut tree = grow(&data, 1.0);
            let before = tree.num_nodes();
            tree.collapse();
            let collapsed = tree.num_nodes();
            assert!(collapsed <= before);
            tree.prune(0.25, raising).unwrap();
            assert!(tree.num_nodes() <= collapsed);
            assert!(tree.num_leaves() >= 1);
        }
    }

    /// Binary labels 0, 1, 0 on three bands of `x`, the first band largest so
    /// the root cuts it off and its right child separates the other two.
    fn stepped_bands() -> Dataset {
        let mut raw = Dataset::new(header_single_numeric(2));
        for (band, label, count) in [(0usize, 0.0, 30usize), (1, 1.0, 20), (2, 0.0, 20)] {
            for i in 0..count {
                let x = band as f64 + 0.05 + 0.9 * (i as f64) / (count as f64);
                raw.push_values(vec![x, label], 1.0).unwrap();
            }
        }
        replicate_data(&raw, 0, None).unwrap()
    }

    #[test]
    fn subtree_raising_grafts_the_largest_branch() {
        let data = stepped_bands();
        let mut tree = grow(&data, 2.0);
        assert_eq!(tree.num_nodes(), 5);
        let root = tree.root;
        let [left, right] = tree.nodes[root].children[..] else {
            panic!("root should split in two");
        };
        assert!(tree.nodes[left].is_leaf());
        assert!(!tree.nodes[right].is_leaf());
        let grandchildren = tree.nodes[right].children.clone();

        // Recount on the rows past the first cut: the left branch empties and
        // the right branch alone explains every row.
        let past_first_band = data.filtered(|row| row.values[0] >= 1.0);
        tree.new_distribution(root, past_first_band.clone()).unwrap();

        tree.prune(0.25, true).unwrap();
        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.num_leaves(), 2);
        assert_eq!(tree.root().children(), &grandchildren[..]);
        let root_total: f64 = tree.root().model().distributions().iter().map(Distribution::total).sum();
        assert!(approx_eq(root_total, past_first_band.sum_of_weights(), 1e-9));
        assert_eq!(tree.root().train.as_ref().map(Dataset::len), Some(40));
    }

    #[test]
    fn without_raising_the_emptied_branch_stays() {
        let data = stepped_bands();
        let mut tree = grow(&data, 2.0);
        let root = tree.root;
        tree.new_distribution(root, data.filtered(|row| row.values[0] >= 1.0)).unwrap();
        tree.prune(0.25, false).unwrap();
        assert_eq!(tree.num_nodes(), 5);
    }

    #[test]
    fn collapse_keeps_a_split_that_removes_errors() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let mut tree = grow(&data, 2.0);
        tree.collapse();
        assert_eq!(tree.num_nodes(), 3);
        assert!(approx_eq(tree.training_errors(tree.root), 0.0, 1e-9));
    }

    #[test]
    fn new_distribution_recounts_every_node() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let mut tree = grow(&data, 2.0);
        let half = data.filtered(|row| row.values[0] < 1.48);
        let root = tree.root;
        tree.new_distribution(root, half.clone()).unwrap();
        let root_total: f64 = tree.root().model().distributions().iter().map(Distribution::total).sum();
        assert!(approx_eq(root_total, half.sum_of_weights(), 1e-9));
        assert_eq!(tree.root().train.as_ref().map(Dataset::len), Some(half.len()));
    }
}

use crate::classifiers::ClassifierError;
use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::model_selection::ModelSelection;
use crate::classifiers::ordinal_tree::nodes::{NodeId, TreeNode};
use crate::classifiers::ordinal_tree::split_models::{NoSplit, SplitModel};
use crate::core::dataset::Dataset;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::replication::split_replicas;
use crate::utils::math::{eq, gr};
use rand::Rng;
use std::fmt;
use std::mem;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default)]
pub struct GrowOptions {
    /// `Some(0)` turns the root into a leaf; `None` grows without limit.
    pub max_depth: Option<usize>,
    /// Keep each node's training rows after growing.
    pub keep_data: bool,
}

/// Binary decision tree over stacked replicas, stored as an arena of nodes.
///
/// Nodes detached by pruning stay in the arena until [`ClassifierTree::compact`].
#[derive(Debug, Clone)]
pub struct ClassifierTree {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) root: NodeId,
    header: Arc<InstanceHeader>,
}

impl ClassifierTree {
    /// Grows a tree on the stacked rows `data`. When `holdout` is given it is
    /// routed down alongside the training rows and its per-replica counts are
    /// stored at every node.
    pub fn grow<R: Rng + ?Sized>(
        selection: &ModelSelection<'_>,
        data: Dataset,
        holdout: Option<Dataset>,
        options: GrowOptions,
        rng: &mut R,
    ) -> Result<Self, ClassifierError> {
        let mut tree = Self {
            nodes: Vec::new(),
            root: 0,
            header: Arc::clone(data.header_arc()),
        };
        tree.root = tree.grow_node(selection, data, holdout, options.max_depth, options.keep_data, rng)?;
        Ok(tree)
    }

    fn grow_node<R: Rng + ?Sized>(
        &mut self,
        selection: &ModelSelection<'_>,
        data: Dataset,
        holdout: Option<Dataset>,
        depth: Option<usize>,
        keep_data: bool,
        rng: &mut R,
    ) -> Result<NodeId, ClassifierError> {
        let model = match depth {
            Some(0) => SplitModel::NoSplit(NoSplit::from_data(&data)),
            _ => selection.select_model(&data, rng),
        };
        let test = holdout.as_ref().map(|rows| {
            split_replicas(rows)
                .iter()
                .map(|replica| Distribution::from_split(replica.iter(), replica.num_classes(), &model))
                .collect()
        });

        let num_subsets = model.num_subsets();
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new(model));

        if num_subsets > 1 {
            let model = &self.nodes[id].model;
            let parts = model.split(&data)?;
            let held_parts: Vec<Option<Dataset>> = match &holdout {
                Some(rows) => model.split(rows)?.into_iter().map(Some).collect(),
                None => (0..num_subsets).map(|_| None).collect(),
            };
            let mut children = Vec::with_capacity(num_subsets);
            for (part, held) in parts.into_iter().zip(held_parts) {
                let next_depth = depth.map(|d| d - 1);
                children.push(self.grow_node(selection, part, held, next_depth, keep_data, rng)?);
            }
            self.nodes[id].children = children;
        } else {
            self.nodes[id].is_empty = eq(data.sum_of_weights(), 0.0);
        }

        let node = &mut self.nodes[id];
        node.test = test;
        if keep_data {
            node.train = Some(data);
        }
        Ok(id)
    }

    pub fn header(&self) -> &InstanceHeader {
        &self.header
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Probability of `class` for one stacked row, weighted by `weight`.
    pub fn get_probs(&self, class: usize, instance: &dyn Instance, laplace: bool) -> f64 {
        self.probs_at(self.root, class, instance, 1.0, laplace)
    }

    fn probs_at(
        &self,
        id: NodeId,
        class: usize,
        instance: &dyn Instance,
        weight: f64,
        laplace: bool,
    ) -> f64 {
        let node = &self.nodes[id];
        let class_prob = |subset: Option<usize>| {
            if laplace {
                node.model.class_prob_laplace(class, instance, subset)
            } else {
                node.model.class_prob(class, instance, subset)
            }
        };
        if node.is_leaf() {
            return weight * class_prob(None);
        }

        match node.model.which_subset(instance) {
            Some(subset) => match node.children.get(subset) {
                Some(&child) if !self.nodes[child].is_empty => {
                    self.probs_at(child, class, instance, weight, laplace)
                }
                _ => weight * class_prob(Some(subset)),
            },
            None => {
                let shares = node.model.weights(instance).unwrap_or_default();
                node.children
                    .iter()
                    .zip(shares)
                    .filter(|(child, _)| !self.nodes[**child].is_empty)
                    .map(|(&child, share)| self.probs_at(child, class, instance, share * weight, laplace))
                    .sum()
            }
        }
    }

    /// `[P(0), P(1)]` of the binary question asked by the row's replica.
    pub fn distribution_for_replica(&self, instance: &dyn Instance, laplace: bool) -> [f64; 2] {
        [
            self.get_probs(0, instance, laplace),
            self.get_probs(1, instance, laplace),
        ]
    }

    /// 1 when the row's replica votes "above", 0 otherwise.
    pub fn classify_replica(&self, instance: &dyn Instance, laplace: bool) -> usize {
        let [below, above] = self.distribution_for_replica(instance, laplace);
        usize::from(gr(above, below))
    }

    fn reachable(&self) -> Vec<NodeId> {
        let mut seen = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            seen.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        seen
    }

    pub fn num_nodes(&self) -> usize {
        self.reachable().len()
    }

    pub fn num_leaves(&self) -> usize {
        self.reachable()
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .count()
    }

    /// Releases the stored training rows and hold-out counts.
    pub fn cleanup(&mut self) {
        for node in &mut self.nodes {
            node.train = None;
            node.test = None;
        }
    }

    /// Drops nodes no longer reachable from the root and renumbers the rest.
    pub fn compact(&mut self) {
        let mut old: Vec<Option<TreeNode>> = mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut kept = Vec::with_capacity(old.len());
        self.root = Self::move_subtree(&mut old, &mut kept, self.root);
        self.nodes = kept;
    }

    fn move_subtree(old: &mut [Option<TreeNode>], kept: &mut Vec<TreeNode>, id: NodeId) -> NodeId {
        let Some(mut node) = old.get_mut(id).and_then(Option::take) else {
            return id;
        };
        let children = mem::take(&mut node.children);
        let new_id = kept.len();
        kept.push(node);
        let remapped: Vec<NodeId> = children
            .into_iter()
            .map(|child| Self::move_subtree(old, kept, child))
            .collect();
        kept[new_id].children = remapped;
        new_id
    }

    fn dump_label(model: &SplitModel, bag: usize, header: &InstanceHeader) -> String {
        let class_name = |class: usize| {
            header
                .nominal_attribute(header.class_index())
                .and_then(|a| a.value(class))
                .map(str::to_string)
                .unwrap_or_else(|| class.to_string())
        };
        let distributions = model.distributions();
        let majorities: Vec<String> = distributions
            .iter()
            .map(|d| class_name(d.max_class_in_bag(bag)))
            .collect();
        let weight: f64 = distributions.iter().map(|d| d.per_bag(bag)).sum();
        let wrong: f64 = distributions.iter().map(|d| d.num_incorrect_in_bag(bag)).sum();

        let mut label = format!("[{}] ({}", majorities.join(" "), round2(weight));
        if gr(wrong, 0.0) {
            label.push_str(&format!("/{}", round2(wrong)));
        }
        label.push(')');
        label
    }

    fn dump_tree(&self, id: NodeId, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[id];
        for (i, &child) in node.children.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{}", "|   ".repeat(depth))?;
            write!(
                f,
                "{}{}",
                node.model.left_side(&self.header),
                node.model.right_side(i, &self.header)
            )?;
            if self.nodes[child].is_leaf() {
                write!(f, ": {}", Self::dump_label(&node.model, i, &self.header))?;
            } else {
                self.dump_tree(child, depth + 1, f)?;
            }
        }
        Ok(())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for ClassifierTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.root();
        if root.is_leaf() {
            write!(f, ": {}", Self::dump_label(&root.model, 0, &self.header))
        } else {
            self.dump_tree(self.root, 0, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::ordinal_tree::optimization_criterion::OptimizationCriterion;
    use crate::classifiers::ordinal_tree::split_models::SplitSettings;
    use crate::replication::{replicate_data, replicate_instance};
    use crate::testing::dummies::{banded_dataset, header_single_numeric, unsplittable_dataset};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn settings() -> SplitSettings {
        SplitSettings {
            min_no_obj: 2.0,
            use_mdl_correction: true,
            criterion: OptimizationCriterion::Sum,
        }
    }

    fn grow(data: &Dataset, options: GrowOptions) -> ClassifierTree {
        let selection = ModelSelection::new(settings(), usize::MAX, data);
        let mut rng = StdRng::seed_from_u64(1);
        ClassifierTree::grow(&selection, data.clone(), None, options, &mut rng).unwrap()
    }

    fn replicas_at(x: f64) -> Dataset {
        let mut single = Dataset::new(header_single_numeric(3));
        single.push_values(vec![x, f64::NAN], 1.0).unwrap();
        replicate_instance(single.get(0).unwrap()).unwrap()
    }

    #[test]
    fn banded_data_grows_one_split() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let tree = grow(&data, GrowOptions::default());
        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.num_leaves(), 2);
        assert!(!tree.root().is_leaf());
        assert!(tree.root().train.is_none());
    }

    #[test]
    fn replicas_vote_by_their_own_threshold() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let tree = grow(&data, GrowOptions::default());

        let votes = |x: f64| -> Vec<usize> {
            replicas_at(x)
                .iter()
                .map(|row| tree.classify_replica(row, false))
                .collect()
        };
        assert_eq!(votes(0.5), vec![0, 0]);
        assert_eq!(votes(1.5), vec![1, 0]);
        assert_eq!(votes(2.5), vec![1, 1]);

        let rows = replicas_at(1.5);
        let [below, above] = tree.distribution_for_replica(rows.get(0).unwrap(), false);
        assert!(approx_eq(below + above, 1.0, 1e-9));
        let [below, above] = tree.distribution_for_replica(rows.get(0).unwrap(), true);
        assert!(above > below && above < 1.0);
    }

    #[test]
    fn missing_value_averages_over_children() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let tree = grow(&data, GrowOptions::default());
        let rows = replicas_at(f64::NAN);
        let first = rows.get(0).unwrap();
        let p0 = tree.get_probs(0, first, false);
        let p1 = tree.get_probs(1, first, false);
        assert!(approx_eq(p0 + p1, 1.0, 1e-9));
        assert!(approx_eq(p1, 40.0 / 60.0, 1e-9));
    }

    #[test]
    fn zero_depth_makes_a_single_leaf() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let tree = grow(
            &data,
            GrowOptions {
                max_depth: Some(0),
                keep_data: true,
            },
        );
        assert_eq!(tree.num_nodes(), 1);
        assert_eq!(tree.num_leaves(), 1);
        assert!(tree.root().train.is_some());
        assert!(tree.to_string().starts_with(": ["));
    }

    /// Binary labels 0, 1, 0 over three bands of `x`; no single cut separates them.
    fn alternating_bands(per_band: usize) -> Dataset {
        let mut raw = Dataset::new(header_single_numeric(2));
        for (band, label) in [0.0, 1.0, 0.0].into_iter().enumerate() {
            for i in 0..per_band {
                let x = band as f64 + 0.05 + 0.9 * (i as f64) / (per_band as f64);
                raw.push_values(vec![x, label], 1.0).unwrap();
            }
        }
        replicate_data(&raw, 0, None).unwrap()
    }

    #[test]
    fn depth_limit_stops_below_the_root() {
        let data = alternating_bands(20);
        let unlimited = grow(&data, GrowOptions::default());
        assert!(unlimited.num_nodes() > 3);

        let limited = grow(
            &data,
            GrowOptions {
                max_depth: Some(1),
                keep_data: false,
            },
        );
        assert_eq!(limited.num_nodes(), 3);
        assert_eq!(limited.num_leaves(), 2);
        assert!(!limited.root().is_leaf());
        for &child in limited.root().children() {
            assert!(limited.node(child).unwrap().is_leaf());
        }
    }

    #[test]
    fn empty_training_leaf_is_flagged() {
        let raw = unsplittable_dataset(&[], 3);
        let data = replicate_data(&raw, 0, None).unwrap();
        let tree = grow(&data, GrowOptions::default());
        assert!(tree.root().is_leaf());
        assert!(tree.root().is_empty());
    }

    #[test]
    fn holdout_counts_are_kept_per_node() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let held = replicate_data(&banded_dataset(5), 0, None).unwrap();
        let selection = ModelSelection::new(settings(), usize::MAX, &data);
        let mut rng = StdRng::seed_from_u64(1);
        let tree =
            ClassifierTree::grow(&selection, data.clone(), Some(held), GrowOptions::default(), &mut rng)
                .unwrap();
        let root_test = tree.root().test.as_ref().unwrap();
        assert_eq!(root_test.len(), 2);
        assert!(root_test.iter().all(|d| approx_eq(d.total(), 15.0, 1e-9)));
        for &child in tree.root().children() {
            assert!(tree.node(child).unwrap().test.is_some());
        }
    }

    #[test]
    fn compact_drops_detached_nodes() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let mut tree = grow(&data, GrowOptions::default());
        let root = tree.root;
        tree.nodes[root].make_leaf();
        assert_eq!(tree.nodes.len(), 3);
        tree.compact();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.num_nodes(), 1);
    }

    #[test]
    fn dump_lists_both_branches() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let tree = grow(&data, GrowOptions::default());
        let text = tree.to_string();
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("x <= ["), "{text}");
        assert!(lines[1].starts_with("x > ["), "{text}");
        assert!(lines[0].ends_with("[0 0] (60)"), "{text}");
        assert!(lines[1].ends_with("[1 1] (60)"), "{text}");
    }
}

use crate::classifiers::ClassifierError;
use crate::classifiers::ordinal_tree::nodes::{ClassifierTree, NodeId};
use crate::core::dataset::Dataset;
use crate::core::instances::Instance;
use crate::replication::get_instance_replica;
use crate::utils::math::{eq, sm_or_eq};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Splits stacked rows into a growing set and a pruning set. Rows are
/// shuffled, grouped by replica and binary label, then dealt round-robin into
/// `num_folds` folds; the last fold is held out.
pub fn holdout_split<R: Rng + ?Sized>(
    data: &Dataset,
    num_folds: usize,
    rng: &mut R,
) -> Result<(Dataset, Dataset), ClassifierError> {
    if num_folds < 2 {
        return Err(ClassifierError::CannotBuild(format!(
            "reduced-error pruning needs at least 2 folds, got {num_folds}"
        )));
    }
    if data.len() < num_folds {
        return Err(ClassifierError::CannotBuild(format!(
            "{} rows cannot be dealt into {num_folds} folds",
            data.len()
        )));
    }

    let rows = data.instances();
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(rng);
    let stratum = |i: usize| {
        let label = rows[i].class_value().filter(|v| !v.is_nan()).map_or(usize::MAX, |v| v as usize);
        (get_instance_replica(&rows[i]), label)
    };
    order.sort_by_key(|&i| stratum(i));

    let mut grow = data.empty_copy();
    let mut held = data.empty_copy();
    for (position, &i) in order.iter().enumerate() {
        if position % num_folds == num_folds - 1 {
            held.push(rows[i].clone())?;
        } else {
            grow.push(rows[i].clone())?;
        }
    }
    Ok((grow, held))
}

impl ClassifierTree {
    /// Bottom-up reduced-error pruning against the hold-out counts stored
    /// while growing.
    pub fn prune_reduced_error(&mut self) {
        self.prune_reduced_error_at(self.root);
    }

    fn prune_reduced_error_at(&mut self, id: NodeId) {
        if self.nodes[id].is_leaf() {
            return;
        }
        for child in self.nodes[id].children.clone() {
            self.prune_reduced_error_at(child);
        }
        let errors_leaf = self.errors_for_leaf(id);
        let errors_tree = self.errors_for_tree(id);
        if sm_or_eq(errors_leaf, errors_tree) {
            debug!(node = id, errors_leaf, errors_tree, "pruned to leaf on hold-out");
            self.nodes[id].make_leaf();
        }
    }

    /// Hold-out errors when every replica predicts its training majority here.
    fn errors_for_leaf(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        let Some(test) = node.test.as_ref() else {
            return 0.0;
        };
        test.iter()
            .zip(node.model.distributions())
            .map(|(held, train)| held.total() - held.per_class(train.max_class()))
            .sum()
    }

    fn errors_for_tree(&self, id: NodeId) -> f64 {
        let node = &self.nodes[id];
        if node.is_leaf() {
            return self.errors_for_leaf(id);
        }
        let train = node.model.distributions();
        let mut errors = 0.0;
        for (bag, &child) in node.children.iter().enumerate() {
            let trained: f64 = train.iter().map(|d| d.per_bag(bag)).sum();
            if eq(trained, 0.0) {
                if let Some(test) = node.test.as_ref() {
                    errors += test
                        .iter()
                        .zip(train)
                        .map(|(held, dist)| {
                            held.per_bag(bag) - held.per_class_per_bag(bag, dist.max_class())
                        })
                        .sum::<f64>();
                }
            } else {
                errors += self.errors_for_tree(child);
            }
        }
        errors
    }
}

use crate::classifiers::ClassifierError;
use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::split_models::{BinarySplit, NoSplit};
use crate::core::dataset::Dataset;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::replication::{get_distributions, get_instance_replica, split_replicas};
use crate::utils::math::gr;

/// The test stored at a tree node, with the per-replica class counts of its subsets.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitModel {
    NoSplit(NoSplit),
    Binary(BinarySplit),
}

impl SplitModel {
    pub fn no_split(distributions: Vec<Distribution>) -> Self {
        SplitModel::NoSplit(NoSplit::new(distributions))
    }

    pub fn is_no_split(&self) -> bool {
        matches!(self, SplitModel::NoSplit(_))
    }

    pub fn num_subsets(&self) -> usize {
        match self {
            SplitModel::NoSplit(_) => 1,
            SplitModel::Binary(split) => split.num_subsets(),
        }
    }

    /// A model is usable once it has at least one subset.
    pub fn check_model(&self) -> bool {
        self.num_subsets() > 0
    }

    pub fn distributions(&self) -> &[Distribution] {
        match self {
            SplitModel::NoSplit(leaf) => leaf.distributions(),
            SplitModel::Binary(split) => split.distributions(),
        }
    }

    /// Every replica's distribution folded into a single bag.
    pub fn merged_distributions(&self) -> Vec<Distribution> {
        self.distributions().iter().map(Distribution::merged).collect()
    }

    /// Subset of `instance`, or `None` when it is missing the split attribute.
    pub fn which_subset(&self, instance: &dyn Instance) -> Option<usize> {
        match self {
            SplitModel::NoSplit(_) => Some(0),
            SplitModel::Binary(split) => split.which_subset(instance),
        }
    }

    pub fn weights(&self, instance: &dyn Instance) -> Option<Vec<f64>> {
        match self {
            SplitModel::NoSplit(_) => None,
            SplitModel::Binary(split) => split.weights(instance),
        }
    }

    fn replica_distribution(&self, instance: &dyn Instance) -> Option<&Distribution> {
        self.distributions().get(get_instance_replica(instance))
    }

    pub fn class_prob(&self, class: usize, instance: &dyn Instance, subset: Option<usize>) -> f64 {
        let Some(dist) = self.replica_distribution(instance) else {
            return 0.0;
        };
        match subset {
            Some(bag) => dist.prob_in_bag(class, bag),
            None => match self.weights(instance) {
                None => dist.prob(class),
                Some(weights) => weights
                    .iter()
                    .enumerate()
                    .map(|(bag, w)| w * dist.prob_in_bag(class, bag))
                    .sum(),
            },
        }
    }

    pub fn class_prob_laplace(
        &self,
        class: usize,
        instance: &dyn Instance,
        subset: Option<usize>,
    ) -> f64 {
        let Some(dist) = self.replica_distribution(instance) else {
            return 0.0;
        };
        match subset {
            Some(bag) => dist.laplace_prob_in_bag(class, bag),
            None => match self.weights(instance) {
                None => dist.laplace_prob(class),
                Some(weights) => weights
                    .iter()
                    .enumerate()
                    .map(|(bag, w)| w * dist.laplace_prob_in_bag(class, bag))
                    .sum(),
            },
        }
    }

    /// Partitions `data` by subset. Rows missing the split attribute are copied
    /// into every subset with a positive share, their weight scaled by it.
    pub fn split(&self, data: &Dataset) -> Result<Vec<Dataset>, ClassifierError> {
        let mut subsets: Vec<Dataset> = (0..self.num_subsets()).map(|_| data.empty_copy()).collect();
        for row in data {
            match self.which_subset(row) {
                Some(subset) => {
                    if let Some(target) = subsets.get_mut(subset) {
                        target.push(row.clone())?;
                    }
                }
                None => {
                    let Some(weights) = self.weights(row) else {
                        continue;
                    };
                    for (target, share) in subsets.iter_mut().zip(weights) {
                        if gr(share, 0.0) {
                            let mut copy = row.clone();
                            copy.set_weight(share * row.weight)?;
                            target.push(copy)?;
                        }
                    }
                }
            }
        }
        Ok(subsets)
    }

    /// Recomputes the per-replica subset distributions from `data`.
    pub fn reset_distributions(&mut self, data: &Dataset) {
        let replicas = split_replicas(data);
        let model: &SplitModel = self;
        let fresh = match model {
            SplitModel::NoSplit(_) => get_distributions(&replicas),
            SplitModel::Binary(split) => replicas
                .iter()
                .map(|replica| {
                    let known = replica.iter().filter(|row| split.which_subset(*row).is_some());
                    let mut dist = Distribution::from_split(known, replica.num_classes(), model);
                    dist.add_inst_with_unknown(replica.iter(), split.att_index());
                    dist
                })
                .collect(),
        };
        match self {
            SplitModel::NoSplit(leaf) => leaf.set_distributions(fresh),
            SplitModel::Binary(split) => split.set_distributions(fresh),
        }
    }

    pub fn left_side(&self, header: &InstanceHeader) -> String {
        match self {
            SplitModel::NoSplit(_) => String::new(),
            SplitModel::Binary(split) => split.left_side(header),
        }
    }

    pub fn right_side(&self, index: usize, header: &InstanceHeader) -> String {
        match self {
            SplitModel::NoSplit(_) => String::new(),
            SplitModel::Binary(split) => split.right_side(index, header),
        }
    }
}

use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::core::dataset::Dataset;
use crate::replication::{get_distributions, split_replicas};

/// Leaf model: every row falls into the single subset.
#[derive(Debug, Clone, PartialEq)]
pub struct NoSplit {
    distributions: Vec<Distribution>,
}

impl NoSplit {
    pub fn new(distributions: Vec<Distribution>) -> Self {
        Self { distributions }
    }

    /// One single-bag distribution per replica of the stacked `data`.
    pub fn from_data(data: &Dataset) -> Self {
        Self::new(get_distributions(&split_replicas(data)))
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    pub(crate) fn set_distributions(&mut self, distributions: Vec<Distribution>) {
        self.distributions = distributions;
    }
}

use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::optimization_criterion::OptimizationCriterion;
use crate::classifiers::ordinal_tree::split_criteria::{
    gain_ratio, info_gain, info_gain_with_old_ent, old_ent, xor_guard_triggered,
};
use crate::core::dataset::Dataset;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::replication::get_instance_replica;
use crate::utils::math::{gr, gr_or_eq, log2, sm, sm_or_eq};
use tracing::debug;

/// Knobs shared by every candidate split at a node.
#[derive(Debug, Clone, Copy)]
pub struct SplitSettings {
    pub min_no_obj: f64,
    pub use_mdl_correction: bool,
    pub criterion: OptimizationCriterion,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SplitPoint {
    /// Nominal value sent to subset 0, shared by every replica.
    Value(Option<usize>),
    /// Upper bound of subset 0 per replica. `None` keeps all of that
    /// replica's rows in subset 0.
    Thresholds(Vec<Option<f64>>),
}

/// Two-way split of one attribute, evaluated separately for every replica.
#[derive(Debug, Clone, PartialEq)]
pub struct BinarySplit {
    att_index: usize,
    num_subsets: usize,
    split_point: SplitPoint,
    info_gain: Vec<f64>,
    gain_ratio: Vec<f64>,
    active: Vec<bool>,
    distributions: Vec<Distribution>,
    criterion: OptimizationCriterion,
}

fn known_value(row: &dyn Instance, att_index: usize) -> Option<f64> {
    row.value_at_index(att_index).filter(|v| !v.is_nan())
}

impl BinarySplit {
    /// Evaluates attribute `att_index` on the node rows `data`, already split
    /// into `replicas`. `sum_of_weights` is the node's total weight.
    pub fn build(
        att_index: usize,
        data: &Dataset,
        replicas: &[Dataset],
        sum_of_weights: f64,
        settings: &SplitSettings,
    ) -> Self {
        let num_replicas = replicas.len();
        let nominal = data.header().is_nominal(att_index);
        let mut split = Self {
            att_index,
            num_subsets: 0,
            split_point: if nominal {
                SplitPoint::Value(None)
            } else {
                SplitPoint::Thresholds(vec![None; num_replicas])
            },
            info_gain: vec![0.0; num_replicas],
            gain_ratio: vec![0.0; num_replicas],
            active: vec![false; num_replicas],
            distributions: vec![Distribution::new(2, data.num_classes()); num_replicas],
            criterion: settings.criterion,
        };

        if nominal {
            split.handle_enumerated_attribute(data, replicas, sum_of_weights, settings);
        } else {
            split.handle_numeric_attribute(replicas, sum_of_weights, settings);
        }
        split
    }

    fn value_distribution<'a, I>(&self, rows: I, num_values: usize, num_classes: usize) -> Distribution
    where
        I: IntoIterator<Item = &'a DenseInstance>,
    {
        let mut dist = Distribution::new(num_values, num_classes);
        for row in rows {
            if let Some(v) = known_value(row, self.att_index) {
                let bag = v as usize;
                if bag < num_values {
                    dist.add(bag, row);
                }
            }
        }
        dist
    }

    /// One value against the rest, scored on the pooled rows and applied
    /// identically to every replica.
    fn handle_enumerated_attribute(
        &mut self,
        data: &Dataset,
        replicas: &[Dataset],
        sum_of_weights: f64,
        settings: &SplitSettings,
    ) {
        let num_values = data.header().num_values(self.att_index).unwrap_or(0);
        let num_classes = data.num_classes();
        let pooled = self.value_distribution(data.iter(), num_values, num_classes);
        let per_replica: Vec<Distribution> = replicas
            .iter()
            .map(|replica| self.value_distribution(replica.iter(), num_values, num_classes))
            .collect();

        let mut best_gain_ratio = 0.0;
        for value in 0..num_values {
            if !gr_or_eq(pooled.per_bag(value), settings.min_no_obj) {
                continue;
            }
            let candidate = Distribution::one_vs_rest(&pooled, value);
            if !candidate.check(settings.min_no_obj) {
                continue;
            }

            self.num_subsets = 2;
            let current_gain = info_gain(&candidate, sum_of_weights);
            let current_ratio = gain_ratio(&candidate, sum_of_weights, current_gain);
            if value == 0 || gr(current_ratio, best_gain_ratio) {
                best_gain_ratio = current_ratio;
                for (replica, dist) in per_replica.iter().enumerate() {
                    self.distributions[replica] = Distribution::one_vs_rest(dist, value);
                    self.info_gain[replica] = current_gain;
                    self.gain_ratio[replica] = current_ratio;
                    self.active[replica] = true;
                }
                self.split_point = SplitPoint::Value(Some(value));
            }
        }
    }

    fn handle_numeric_attribute(
        &mut self,
        replicas: &[Dataset],
        sum_of_weights: f64,
        settings: &SplitSettings,
    ) {
        let mut thresholds = Vec::with_capacity(replicas.len());
        for (replica, rows) in replicas.iter().enumerate() {
            let mut sorted = rows.clone();
            sorted.sort_by_attribute(self.att_index);
            let threshold = self.handle_numeric_replica(&sorted, replica, sum_of_weights, settings);

            if threshold.is_none() {
                let dist = Distribution::from_instances(rows.iter(), rows.num_classes());
                if xor_guard_triggered(&dist) {
                    debug!(
                        attribute = self.att_index,
                        replica,
                        total = dist.total(),
                        "balanced replica left unsplit"
                    );
                }
            }
            thresholds.push(threshold);
        }
        self.split_point = SplitPoint::Thresholds(thresholds);
    }

    /// Sweeps the sorted rows of one replica for the best cut. Returns the
    /// threshold when the replica ends up with a split.
    fn handle_numeric_replica(
        &mut self,
        sorted: &Dataset,
        replica: usize,
        sum_of_weights: f64,
        settings: &SplitSettings,
    ) -> Option<f64> {
        let att = self.att_index;
        let num_classes = sorted.num_classes();
        let rows = sorted.instances();
        let first_miss = rows
            .iter()
            .position(|row| known_value(row, att).is_none())
            .unwrap_or(rows.len());
        let value_at = |i: usize| rows[i].values[att];

        let mut unsplit = Distribution::new(2, num_classes);
        unsplit.add_range(0, rows, 0, first_miss);
        self.distributions[replica] = unsplit;

        let mut dist = Distribution::new(2, num_classes);
        dist.add_range(1, rows, 0, first_miss);

        let mut min_split = 0.1 * dist.total() / num_classes as f64;
        if sm_or_eq(min_split, settings.min_no_obj) {
            min_split = settings.min_no_obj;
        } else if gr(min_split, 25.0) {
            min_split = 25.0;
        }
        if sm(first_miss as f64, 2.0 * min_split) {
            return None;
        }

        let default_ent = old_ent(&dist);
        let mut best_gain = 0.0;
        let mut split_index = None;
        let mut candidates = 0usize;
        let mut last = 0;
        for next in 1..first_miss {
            if value_at(next - 1) + 1e-5 < value_at(next) {
                dist.shift_range(1, 0, rows, last, next);
                if gr_or_eq(dist.per_bag(0), min_split)
                    && gr_or_eq(dist.per_bag(1), min_split)
                    && gr(dist.per_class(0), 0.0)
                    && gr(dist.per_class(1), 0.0)
                {
                    let gain = info_gain_with_old_ent(&dist, sum_of_weights, default_ent);
                    if gr(gain, best_gain) {
                        best_gain = gain;
                        split_index = Some(next - 1);
                    }
                    candidates += 1;
                }
                last = next;
            }
        }

        if candidates == 0 {
            return None;
        }
        if settings.use_mdl_correction {
            best_gain -= log2(candidates as f64) / sum_of_weights;
        }
        if sm_or_eq(best_gain, 0.0) {
            return None;
        }
        let split_index = split_index?;

        let lower = value_at(split_index);
        let upper = value_at(split_index + 1);
        let mut threshold = (lower + upper) / 2.0;
        if threshold == upper {
            threshold = lower;
        }

        let mut best = Distribution::new(2, num_classes);
        best.add_range(0, rows, 0, split_index + 1);
        best.add_range(1, rows, split_index + 1, first_miss);

        self.num_subsets = 2;
        self.active[replica] = true;
        self.info_gain[replica] = best_gain;
        self.gain_ratio[replica] = gain_ratio(&best, sum_of_weights, best_gain);
        self.distributions[replica] = best;
        Some(threshold)
    }

    /// Moves every numeric threshold down onto the largest value of
    /// `all_data` that does not exceed it.
    pub fn set_split_point(&mut self, all_data: &Dataset) {
        let att = self.att_index;
        if self.num_subsets <= 1 {
            return;
        }
        let SplitPoint::Thresholds(points) = &mut self.split_point else {
            return;
        };
        for point in points.iter_mut() {
            let Some(threshold) = *point else {
                continue;
            };
            let mut adjusted = f64::MIN;
            for row in all_data {
                if let Some(v) = known_value(row, att) {
                    if gr(v, adjusted) && sm_or_eq(v, threshold) {
                        adjusted = v;
                    }
                }
            }
            *point = Some(adjusted);
        }
    }

    pub fn att_index(&self) -> usize {
        self.att_index
    }

    pub fn num_subsets(&self) -> usize {
        self.num_subsets
    }

    pub fn split_point(&self) -> &SplitPoint {
        &self.split_point
    }

    pub fn is_active(&self, replica: usize) -> bool {
        self.active.get(replica).copied().unwrap_or(false)
    }

    pub fn info_gain(&self) -> f64 {
        self.criterion.combine(&self.info_gain, &self.active)
    }

    pub fn gain_ratio(&self) -> f64 {
        self.criterion.combine(&self.gain_ratio, &self.active)
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    pub fn distributions_mut(&mut self) -> &mut [Distribution] {
        &mut self.distributions
    }

    pub(crate) fn set_distributions(&mut self, distributions: Vec<Distribution>) {
        self.distributions = distributions;
    }

    pub fn which_subset(&self, instance: &dyn Instance) -> Option<usize> {
        let value = known_value(instance, self.att_index)?;
        match &self.split_point {
            SplitPoint::Value(chosen) => {
                Some(if *chosen == Some(value as usize) { 0 } else { 1 })
            }
            SplitPoint::Thresholds(points) => {
                match points.get(get_instance_replica(instance)).copied().flatten() {
                    Some(threshold) if !sm_or_eq(value, threshold) => Some(1),
                    _ => Some(0),
                }
            }
        }
    }

    /// Subset shares of the row's replica, for rows missing the attribute.
    pub fn weights(&self, instance: &dyn Instance) -> Option<Vec<f64>> {
        if known_value(instance, self.att_index).is_some() {
            return None;
        }
        let n = self.num_subsets;
        let shares = match self.distributions.get(get_instance_replica(instance)) {
            Some(dist) if gr(dist.total(), 0.0) => {
                (0..n).map(|bag| dist.per_bag(bag) / dist.total()).collect()
            }
            _ => vec![1.0 / n as f64; n],
        };
        Some(shares)
    }

    pub fn left_side(&self, header: &InstanceHeader) -> String {
        header
            .attribute_at_index(self.att_index)
            .map(|a| a.name())
            .unwrap_or_default()
    }

    pub fn right_side(&self, index: usize, header: &InstanceHeader) -> String {
        let op = |low: &str, high: &str| if index == 0 { low.to_string() } else { high.to_string() };
        match &self.split_point {
            SplitPoint::Value(chosen) => {
                let label = chosen
                    .and_then(|v| {
                        header
                            .nominal_attribute(self.att_index)
                            .and_then(|a| a.value(v))
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| "?".into());
                format!(" {} {label}", op("=", "!="))
            }
            SplitPoint::Thresholds(points) => {
                let listed: String = points
                    .iter()
                    .map(|p| match p {
                        Some(t) => format!("{t} "),
                        None => "INF ".to_string(),
                    })
                    .collect();
                format!(" {} [{listed}]", op("<=", ">"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replication::{replicate_data, split_replicas};
    use crate::testing::dummies::{banded_dataset, header_ordinal, nominal_dataset};

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

    fn build(data: &Dataset, att: usize) -> BinarySplit {
        let replicas = split_replicas(data);
        BinarySplit::build(att, data, &replicas, data.sum_of_weights(), &settings())
    }

    #[test]
    fn numeric_bands_split_each_replica_at_its_own_boundary() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let split = build(&data, 0);

        assert_eq!(split.num_subsets(), 2);
        assert!(split.is_active(0) && split.is_active(1));
        let SplitPoint::Thresholds(points) = split.split_point() else {
            panic!("numeric attribute must yield thresholds");
        };
        let t0 = points[0].unwrap();
        let t1 = points[1].unwrap();
        assert!(t0 > 0.9 && t0 < 1.05, "{t0}");
        assert!(t1 > 1.9 && t1 < 2.05, "{t1}");

        for (replica, dist) in split.distributions().iter().enumerate() {
            assert!(approx_eq(dist.total(), 60.0, 1e-9), "replica {replica}");
            assert!(approx_eq(dist.num_incorrect_per_bag(), 0.0, 1e-9));
        }
        assert!(split.info_gain() > 0.0);
        assert!(split.gain_ratio() > 0.0);
    }

    #[test]
    fn which_subset_uses_the_row_replica_threshold() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let split = build(&data, 0);

        let mut query = Dataset::new(crate::testing::dummies::header_single_numeric(3));
        query.push_values(vec![1.5, f64::NAN], 1.0).unwrap();
        let rows = crate::replication::replicate_instance(query.get(0).unwrap()).unwrap();
        assert_eq!(split.which_subset(rows.get(0).unwrap()), Some(1));
        assert_eq!(split.which_subset(rows.get(1).unwrap()), Some(0));
    }

    #[test]
    fn set_split_point_snaps_to_observed_values() {
        let data = replicate_data(&banded_dataset(20), 0, None).unwrap();
        let mut split = build(&data, 0);
        split.set_split_point(&data);
        let SplitPoint::Thresholds(points) = split.split_point() else {
            panic!("numeric attribute must yield thresholds");
        };
        for point in points.iter().flatten() {
            assert!(data.iter().any(|row| row.values[0] == *point));
        }
    }

    #[test]
    fn too_few_rows_leave_replicas_inactive() {
        let data = replicate_data(&banded_dataset(1), 0, None).unwrap();
        let split = build(&data, 0);
        assert_eq!(split.num_subsets(), 0);
        assert_eq!(split.info_gain(), 0.0);
        assert_eq!(split.gain_ratio(), 0.0);
        for dist in split.distributions() {
            assert_eq!(dist.per_bag(1), 0.0);
        }
    }

    #[test]
    fn nominal_split_shares_one_value_across_replicas() {
        let data = replicate_data(&nominal_dataset(3, 4), 0, None).unwrap();
        let split = build(&data, 0);

        assert_eq!(split.num_subsets(), 2);
        assert!(split.is_active(0) && split.is_active(1));
        let SplitPoint::Value(Some(value)) = split.split_point() else {
            panic!("nominal attribute must yield a value");
        };
        assert!(*value < 3);
        assert_eq!(split.info_gain[0], split.info_gain[1]);
        assert_eq!(split.right_side(0, data.header()), format!(" = s{value}"));
        assert_eq!(split.right_side(1, data.header()), format!(" != s{value}"));
        assert_eq!(split.left_side(data.header()), "shape");
    }

    #[test]
    fn missing_values_get_replica_weights() {
        let mut raw = Dataset::new(header_ordinal(3));
        for i in 0..12 {
            let class = (i % 3) as f64;
            raw.push_values(vec![class + 0.5, 0.0, class], 1.0).unwrap();
        }
        let data = replicate_data(&raw, 0, None).unwrap();
        let split = build(&data, 0);

        let mut query = Dataset::new(header_ordinal(3));
        query.push_values(vec![f64::NAN, 0.0, 1.0], 1.0).unwrap();
        let rows = crate::replication::replicate_instance(query.get(0).unwrap()).unwrap();
        let row = rows.get(0).unwrap();
        assert_eq!(split.which_subset(row), None);
        let weights = split.weights(row).unwrap();
        assert_eq!(weights.len(), 2);
        assert!(approx_eq(weights.iter().sum::<f64>(), 1.0, 1e-9));
        assert!(split.weights(data.get(0).unwrap()).is_none());
    }
}

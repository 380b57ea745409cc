use crate::classifiers::ordinal_tree::split_models::SplitModel;
use crate::core::instances::{DenseInstance, Instance};
use crate::utils::math::{eq, gr, gr_or_eq};

/// Weighted class counts per bag (subset) of a split.
///
/// Invariant: `total` equals the sum of `per_bag` and the sum of `per_class`,
/// both of which are the margins of `per_class_per_bag`.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    per_class_per_bag: Vec<Vec<f64>>,
    per_bag: Vec<f64>,
    per_class: Vec<f64>,
    total: f64,
}

impl Distribution {
    pub fn new(num_bags: usize, num_classes: usize) -> Self {
        Self {
            per_class_per_bag: vec![vec![0.0; num_classes]; num_bags],
            per_bag: vec![0.0; num_bags],
            per_class: vec![0.0; num_classes],
            total: 0.0,
        }
    }

    /// One bag holding every labelled row.
    pub fn from_instances<'a, I>(rows: I, num_classes: usize) -> Self
    where
        I: IntoIterator<Item = &'a DenseInstance>,
    {
        let mut dist = Self::new(1, num_classes);
        for row in rows {
            dist.add(0, row);
        }
        dist
    }

    /// Bags follow the subsets of `model`; unresolved rows are spread by its weights.
    pub fn from_split<'a, I>(rows: I, num_classes: usize, model: &SplitModel) -> Self
    where
        I: IntoIterator<Item = &'a DenseInstance>,
    {
        let mut dist = Self::new(model.num_subsets().max(1), num_classes);
        for row in rows {
            match model.which_subset(row) {
                Some(bag) => dist.add(bag, row),
                None => {
                    if let Some(weights) = model.weights(row) {
                        dist.add_weights(row, &weights);
                    }
                }
            }
        }
        dist
    }

    /// Collapses every bag of `to_merge` into a single bag.
    pub fn merged(to_merge: &Distribution) -> Self {
        Self {
            per_class_per_bag: vec![to_merge.per_class.clone()],
            per_bag: vec![to_merge.total],
            per_class: to_merge.per_class.clone(),
            total: to_merge.total,
        }
    }

    /// Two bags: bag `index` of `to_merge` against all the others.
    pub fn one_vs_rest(to_merge: &Distribution, index: usize) -> Self {
        let num_classes = to_merge.num_classes();
        let mut dist = Self::new(2, num_classes);
        for class in 0..num_classes {
            let inside = to_merge.per_class_per_bag[index][class];
            let outside = to_merge.per_class[class] - inside;
            dist.per_class_per_bag[0][class] = inside;
            dist.per_class_per_bag[1][class] = outside;
        }
        dist.per_bag[0] = to_merge.per_bag[index];
        dist.per_bag[1] = to_merge.total - to_merge.per_bag[index];
        dist.per_class = to_merge.per_class.clone();
        dist.total = to_merge.total;
        dist
    }

    fn class_of(instance: &dyn Instance) -> Option<usize> {
        instance
            .class_value()
            .filter(|v| !v.is_nan())
            .map(|v| v as usize)
    }

    pub fn add(&mut self, bag: usize, instance: &dyn Instance) {
        if let Some(class) = Self::class_of(instance) {
            self.add_weight(bag, class, instance.weight());
        }
    }

    fn add_weight(&mut self, bag: usize, class: usize, weight: f64) {
        debug_assert!(
            class < self.per_class.len(),
            "class value {class} outside the {} classes of the distribution",
            self.per_class.len()
        );
        debug_assert!(
            bag < self.per_bag.len(),
            "bag {bag} outside the {} bags of the distribution",
            self.per_bag.len()
        );
        self.per_class_per_bag[bag][class] += weight;
        self.per_bag[bag] += weight;
        self.per_class[class] += weight;
        self.total += weight;
    }

    /// Adds `instance` to every bag, scaled by the matching entry of `weights`.
    pub fn add_weights(&mut self, instance: &dyn Instance, weights: &[f64]) {
        let Some(class) = Self::class_of(instance) else {
            return;
        };
        debug_assert!(
            class < self.per_class.len(),
            "class value {class} outside the {} classes of the distribution",
            self.per_class.len()
        );
        for (bag, &share) in weights.iter().enumerate() {
            let weight = share * instance.weight();
            self.per_class_per_bag[bag][class] += weight;
            self.per_bag[bag] += weight;
        }
        self.per_class[class] += instance.weight();
        self.total += instance.weight();
    }

    pub fn add_range(&mut self, bag: usize, rows: &[DenseInstance], start: usize, end: usize) {
        for row in &rows[start..end] {
            self.add(bag, row);
        }
    }

    /// Moves the rows in `start..end` from bag `from` to bag `to`.
    pub fn shift_range(
        &mut self,
        from: usize,
        to: usize,
        rows: &[DenseInstance],
        start: usize,
        end: usize,
    ) {
        for row in &rows[start..end] {
            if let Some(class) = Self::class_of(row) {
                let weight = row.weight();
                self.per_class_per_bag[from][class] -= weight;
                self.per_class_per_bag[to][class] += weight;
                self.per_bag[from] -= weight;
                self.per_bag[to] += weight;
            }
        }
    }

    /// Spreads rows missing `att_index` over the bags in proportion to bag weight.
    pub fn add_inst_with_unknown<'a, I>(&mut self, rows: I, att_index: usize)
    where
        I: IntoIterator<Item = &'a DenseInstance>,
    {
        let num_bags = self.per_bag.len();
        let probs: Vec<f64> = self
            .per_bag
            .iter()
            .map(|&w| {
                if eq(self.total, 0.0) {
                    1.0 / num_bags as f64
                } else {
                    w / self.total
                }
            })
            .collect();

        for row in rows {
            if !row.is_missing_at_index(att_index).unwrap_or(false) {
                continue;
            }
            let Some(class) = Self::class_of(row) else {
                continue;
            };
            let weight = row.weight();
            self.per_class[class] += weight;
            self.total += weight;
            for (bag, prob) in probs.iter().enumerate() {
                let share = prob * weight;
                self.per_class_per_bag[bag][class] += share;
                self.per_bag[bag] += share;
            }
        }
    }

    /// True when at least two bags reach `min_no_obj`.
    pub fn check(&self, min_no_obj: f64) -> bool {
        self.per_bag
            .iter()
            .filter(|&&w| gr_or_eq(w, min_no_obj))
            .count()
            > 1
    }

    pub fn num_bags(&self) -> usize {
        self.per_bag.len()
    }

    pub fn num_classes(&self) -> usize {
        self.per_class.len()
    }

    pub fn per_bag(&self, bag: usize) -> f64 {
        self.per_bag[bag]
    }

    pub fn per_class(&self, class: usize) -> f64 {
        self.per_class[class]
    }

    pub fn per_class_per_bag(&self, bag: usize, class: usize) -> f64 {
        self.per_class_per_bag[bag][class]
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn max_class(&self) -> usize {
        arg_max(&self.per_class)
    }

    /// Majority class of one bag, falling back to the overall majority for empty bags.
    pub fn max_class_in_bag(&self, bag: usize) -> usize {
        if gr(self.per_bag[bag], 0.0) {
            arg_max(&self.per_class_per_bag[bag])
        } else {
            self.max_class()
        }
    }

    pub fn max_bag(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_weight = 0.0;
        for (bag, &w) in self.per_bag.iter().enumerate() {
            if gr(w, best_weight) {
                best = Some(bag);
                best_weight = w;
            }
        }
        best
    }

    /// Weight misclassified when every bag predicts the overall majority class.
    pub fn num_incorrect(&self) -> f64 {
        if self.per_class.is_empty() {
            return 0.0;
        }
        self.total - self.per_class[self.max_class()]
    }

    pub fn num_incorrect_in_bag(&self, bag: usize) -> f64 {
        self.per_bag[bag] - self.per_class_per_bag[bag][self.max_class_in_bag(bag)]
    }

    /// Weight misclassified when each bag predicts its own majority class.
    pub fn num_incorrect_per_bag(&self) -> f64 {
        (0..self.num_bags())
            .map(|bag| self.num_incorrect_in_bag(bag))
            .sum()
    }

    pub fn prob(&self, class: usize) -> f64 {
        if eq(self.total, 0.0) {
            0.0
        } else {
            self.per_class[class] / self.total
        }
    }

    pub fn prob_in_bag(&self, class: usize, bag: usize) -> f64 {
        if gr(self.per_bag[bag], 0.0) {
            self.per_class_per_bag[bag][class] / self.per_bag[bag]
        } else {
            self.prob(class)
        }
    }

    pub fn laplace_prob(&self, class: usize) -> f64 {
        (self.per_class[class] + 1.0) / (self.total + self.num_classes() as f64)
    }

    pub fn laplace_prob_in_bag(&self, class: usize, bag: usize) -> f64 {
        if gr(self.per_bag[bag], 0.0) {
            (self.per_class_per_bag[bag][class] + 1.0)
                / (self.per_bag[bag] + self.num_classes() as f64)
        } else {
            self.laplace_prob(class)
        }
    }
}

fn arg_max(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = 0.0;
    for (i, &v) in values.iter().enumerate() {
        if gr(v, best_value) {
            best = i;
            best_value = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::Dataset;
    use crate::testing::dummies::header_single_numeric;

    const EPS: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn rows(spec: &[(f64, usize, f64)]) -> Dataset {
        let mut data = Dataset::new(header_single_numeric(2));
        for &(x, class, weight) in spec {
            data.push_values(vec![x, class as f64], weight).unwrap();
        }
        data
    }

    fn assert_margins(dist: &Distribution) {
        let bag_sum: f64 = (0..dist.num_bags()).map(|b| dist.per_bag(b)).sum();
        let class_sum: f64 = (0..dist.num_classes()).map(|c| dist.per_class(c)).sum();
        assert!(approx_eq(bag_sum, dist.total(), EPS));
        assert!(approx_eq(class_sum, dist.total(), EPS));
    }

    #[test]
    fn single_bag_counts_weights_per_class() {
        let data = rows(&[(1.0, 0, 1.0), (2.0, 1, 2.0), (3.0, 1, 0.5)]);
        let dist = Distribution::from_instances(data.iter(), 2);
        assert_eq!(dist.num_bags(), 1);
        assert!(approx_eq(dist.per_class(1), 2.5, EPS));
        assert!(approx_eq(dist.total(), 3.5, EPS));
        assert_eq!(dist.max_class(), 1);
        assert!(approx_eq(dist.num_incorrect(), 1.0, EPS));
        assert_margins(&dist);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "class value 1 outside the 1 classes")]
    fn class_beyond_the_distribution_fails_loudly() {
        let data = rows(&[(1.0, 1, 1.0)]);
        let mut dist = Distribution::new(1, 1);
        dist.add(0, data.get(0).unwrap());
    }

    #[test]
    fn shift_range_moves_rows_between_bags() {
        let data = rows(&[(1.0, 0, 1.0), (2.0, 0, 1.0), (3.0, 1, 1.0), (4.0, 1, 1.0)]);
        let mut dist = Distribution::new(2, 2);
        dist.add_range(1, data.instances(), 0, 4);
        dist.shift_range(1, 0, data.instances(), 0, 2);
        assert!(approx_eq(dist.per_bag(0), 2.0, EPS));
        assert!(approx_eq(dist.per_class_per_bag(0, 0), 2.0, EPS));
        assert!(approx_eq(dist.per_class_per_bag(1, 1), 2.0, EPS));
        assert!(approx_eq(dist.num_incorrect_per_bag(), 0.0, EPS));
        assert!(approx_eq(dist.num_incorrect(), 2.0, EPS));
        assert_margins(&dist);
    }

    #[test]
    fn check_needs_two_bags_over_minimum() {
        let data = rows(&[(1.0, 0, 2.0), (2.0, 1, 1.0)]);
        let mut dist = Distribution::new(2, 2);
        dist.add(0, data.get(0).unwrap());
        dist.add(1, data.get(1).unwrap());
        assert!(dist.check(1.0));
        assert!(!dist.check(2.0));
    }

    #[test]
    fn one_vs_rest_and_merge_keep_totals() {
        let data = rows(&[(1.0, 0, 1.0), (2.0, 1, 1.0), (3.0, 1, 1.0)]);
        let mut three = Distribution::new(3, 2);
        for (bag, row) in data.iter().enumerate() {
            three.add(bag, row);
        }
        let split = Distribution::one_vs_rest(&three, 1);
        assert!(approx_eq(split.per_bag(0), 1.0, EPS));
        assert!(approx_eq(split.per_bag(1), 2.0, EPS));
        assert!(approx_eq(split.per_class_per_bag(1, 1), 1.0, EPS));
        assert_margins(&split);

        let merged = Distribution::merged(&split);
        assert_eq!(merged.num_bags(), 1);
        assert!(approx_eq(merged.total(), 3.0, EPS));
        assert_margins(&merged);
    }

    #[test]
    fn unknown_rows_are_spread_proportionally() {
        let data = rows(&[(1.0, 0, 3.0), (2.0, 1, 1.0), (f64::NAN, 1, 2.0)]);
        let mut dist = Distribution::new(2, 2);
        dist.add(0, data.get(0).unwrap());
        dist.add(1, data.get(1).unwrap());
        dist.add_inst_with_unknown(data.iter(), 0);
        assert!(approx_eq(dist.per_bag(0), 3.0 + 1.5, EPS));
        assert!(approx_eq(dist.per_bag(1), 1.0 + 0.5, EPS));
        assert!(approx_eq(dist.per_class(1), 3.0, EPS));
        assert_margins(&dist);
    }

    #[test]
    fn zero_weight_distribution_is_neutral() {
        let dist = Distribution::new(2, 2);
        assert_eq!(dist.prob(0), 0.0);
        assert_eq!(dist.prob_in_bag(1, 0), 0.0);
        assert_eq!(dist.num_incorrect(), 0.0);
        assert_eq!(dist.max_bag(), None);
        assert!(approx_eq(dist.laplace_prob(1), 0.5, EPS));
    }

    #[test]
    fn bag_probabilities_fall_back_to_overall() {
        let data = rows(&[(1.0, 0, 1.0), (2.0, 1, 3.0)]);
        let mut dist = Distribution::new(2, 2);
        dist.add(0, data.get(0).unwrap());
        dist.add(0, data.get(1).unwrap());
        assert!(approx_eq(dist.prob_in_bag(1, 0), 0.75, EPS));
        assert!(approx_eq(dist.prob_in_bag(1, 1), 0.75, EPS));
        assert!(approx_eq(dist.laplace_prob_in_bag(1, 0), 4.0 / 6.0, EPS));
        assert_eq!(dist.max_class_in_bag(1), 1);
        assert_eq!(dist.max_bag(), Some(0));
    }
}

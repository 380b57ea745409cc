use crate::classifiers::ordinal_tree::split_models::{BinarySplit, SplitModel, SplitSettings};
use crate::core::dataset::Dataset;
use crate::replication::{get_distributions, split_replicas};
use crate::utils::math::{eq, gr, gr_or_eq, sm};
use rand::Rng;
use tracing::debug;

/// Picks the split stored at each node, C4.5 style, over all replicas at once.
pub struct ModelSelection<'a> {
    settings: SplitSettings,
    num_attributes: usize,
    all_data: &'a Dataset,
}

impl<'a> ModelSelection<'a> {
    /// `num_attributes` is how many attributes each node samples before
    /// preferring one of them; `all_data` is the full stacked training set.
    pub fn new(settings: SplitSettings, num_attributes: usize, all_data: &'a Dataset) -> Self {
        Self {
            settings,
            num_attributes,
            all_data,
        }
    }

    pub fn settings(&self) -> &SplitSettings {
        &self.settings
    }

    pub fn select_model<R: Rng + ?Sized>(&self, data: &Dataset, rng: &mut R) -> SplitModel {
        let replicas = split_replicas(data);
        let check = get_distributions(&replicas);
        let min_no_obj = self.settings.min_no_obj;

        let worthy = check.iter().any(|d| {
            gr_or_eq(d.total(), 2.0 * min_no_obj) && !eq(d.total(), d.per_class(d.max_class()))
        });
        if !worthy {
            return SplitModel::no_split(check);
        }

        let header = data.header();
        let class_index = data.class_index();
        let many_values = 0.3 * self.all_data.len() as f64;
        let has_few_values =
            |att: usize| header.num_values(att).is_some_and(|n| sm(n as f64, many_values));
        let multi_val = (0..header.number_of_attributes())
            .filter(|&att| att != class_index)
            .all(|att| header.is_nominal(att) && !has_few_values(att));

        let sum_of_weights = data.sum_of_weights();
        let candidates: Vec<BinarySplit> = (0..class_index)
            .map(|att| BinarySplit::build(att, data, &replicas, sum_of_weights, &self.settings))
            .collect();

        let mut average_info_gain = 0.0;
        let mut valid_models = 0usize;
        for (att, candidate) in candidates.iter().enumerate() {
            let eligible = !header.is_nominal(att) || multi_val || has_few_values(att);
            if candidate.num_subsets() > 0 && eligible {
                average_info_gain += candidate.info_gain();
                valid_models += 1;
            }
        }
        if valid_models == 0 {
            return SplitModel::no_split(check);
        }
        average_info_gain /= valid_models as f64;

        let picked = self.pick_attributes(class_index, rng);
        let mut best: Option<usize> = None;
        let mut best_rand: Option<usize> = None;
        let mut min_result = 0.0;
        let mut min_rand_result = 0.0;
        for (att, candidate) in candidates.iter().enumerate() {
            if candidate.num_subsets() == 0 {
                continue;
            }
            let ratio = candidate.gain_ratio();
            if candidate.info_gain() >= average_info_gain - 1e-3 && gr(ratio, min_result) {
                best = Some(att);
                min_result = ratio;
                if picked[att] {
                    best_rand = Some(att);
                    min_rand_result = ratio;
                }
            }
        }

        if gr(min_rand_result, 0.0) {
            best = best_rand;
            min_result = min_rand_result;
        }
        let Some(att) = best.filter(|_| !eq(min_result, 0.0)) else {
            return SplitModel::no_split(check);
        };
        let Some(mut chosen) = candidates.into_iter().nth(att) else {
            return SplitModel::no_split(check);
        };

        for (dist, replica) in chosen.distributions_mut().iter_mut().zip(&replicas) {
            dist.add_inst_with_unknown(replica.iter(), att);
        }
        chosen.set_split_point(self.all_data);
        debug!(
            attribute = att,
            info_gain = chosen.info_gain(),
            gain_ratio = chosen.gain_ratio(),
            rows = data.len(),
            "selected split"
        );
        SplitModel::Binary(chosen)
    }

    /// Marks `num_attributes` of the first `num_candidates` attributes, drawn by
    /// a partial Fisher–Yates shuffle from the end.
    fn pick_attributes<R: Rng + ?Sized>(&self, num_candidates: usize, rng: &mut R) -> Vec<bool> {
        if self.num_attributes >= num_candidates {
            return vec![true; num_candidates];
        }
        let mut picked = vec![false; num_candidates];
        let mut bag: Vec<usize> = (0..num_candidates).collect();
        for i in (num_candidates - self.num_attributes..num_candidates).rev() {
            let pick = rng.random_range(0..=i);
            picked[bag[pick]] = true;
            if pick != i {
                bag[pick] = bag[i];
            }
        }
        picked
    }
}

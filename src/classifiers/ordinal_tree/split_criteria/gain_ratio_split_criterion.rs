use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::split_criteria::entropy::split_ent;
use crate::utils::math::eq;

/// Normalises `info_gain` by the split information of `bags`.
pub fn gain_ratio(bags: &Distribution, total_no_inst: f64, info_gain: f64) -> f64 {
    let split_info = split_ent(bags, total_no_inst);
    if eq(split_info, 0.0) {
        return 0.0;
    }
    info_gain / (split_info / total_no_inst)
}

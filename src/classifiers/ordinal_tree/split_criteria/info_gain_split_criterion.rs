use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::classifiers::ordinal_tree::split_criteria::entropy::{new_ent, old_ent};
use crate::utils::math::eq;

/// Information gain per unit of weight, discounted by the share of rows
/// (out of `total_no_inst`) that did not reach `bags`.
pub fn info_gain(bags: &Distribution, total_no_inst: f64) -> f64 {
    info_gain_with_old_ent(bags, total_no_inst, old_ent(bags))
}

pub fn info_gain_with_old_ent(bags: &Distribution, total_no_inst: f64, old_ent: f64) -> f64 {
    let no_unknown = total_no_inst - bags.total();
    let unknown_rate = no_unknown / total_no_inst;
    let numerator = (1.0 - unknown_rate) * (old_ent - new_ent(bags));

    if eq(numerator, 0.0) {
        return 0.0;
    }
    numerator / bags.total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::ordinal_tree::split_criteria::entropy::tests::two_bag;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn perfect_split_gains_one_bit() {
        let dist = two_bag([[3.0, 0.0], [0.0, 3.0]]);
        assert!(approx_eq(info_gain(&dist, 6.0), 1.0, 1e-12));
    }

    #[test]
    fn useless_split_gains_nothing() {
        let dist = two_bag([[1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(info_gain(&dist, 6.0), 0.0);
    }

    #[test]
    fn unknown_share_discounts_gain() {
        let dist = two_bag([[3.0, 0.0], [0.0, 3.0]]);
        assert!(approx_eq(info_gain(&dist, 12.0), 0.5, 1e-12));
    }
}

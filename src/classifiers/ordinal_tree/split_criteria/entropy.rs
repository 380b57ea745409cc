use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::utils::math::gr;

/// `num * log2(num)`, with tiny weights treated as zero.
pub fn log_func(num: f64) -> f64 {
    if num < 1e-6 {
        0.0
    } else {
        num * num.log2()
    }
}

/// Class entropy before splitting, scaled by the total weight.
pub fn old_ent(bags: &Distribution) -> f64 {
    let sum: f64 = (0..bags.num_classes())
        .map(|class| log_func(bags.per_class(class)))
        .sum();
    log_func(bags.total()) - sum
}

/// Weighted class entropy of the bags after splitting, scaled by the total weight.
pub fn new_ent(bags: &Distribution) -> f64 {
    let mut value = 0.0;
    for bag in 0..bags.num_bags() {
        for class in 0..bags.num_classes() {
            value += log_func(bags.per_class_per_bag(bag, class));
        }
        value -= log_func(bags.per_bag(bag));
    }
    -value
}

/// Entropy of the bag sizes, with rows missing from `bags` counted as one extra bag.
pub fn split_ent(bags: &Distribution, total_no_inst: f64) -> f64 {
    if !gr(bags.total(), 0.0) {
        return 0.0;
    }
    let no_unknown = total_no_inst - bags.total();
    let mut value = 0.0;
    for bag in 0..bags.num_bags() {
        value -= log_func(bags.per_bag(bag));
    }
    value -= log_func(no_unknown);
    value + log_func(total_no_inst)
}

use crate::classifiers::ordinal_tree::distribution::Distribution;

/// Flags a replica whose classes are close to balanced over more than ten
/// units of weight. No split criterion reacts to it yet; callers only report it.
pub fn xor_guard_triggered(dist: &Distribution) -> bool {
    if dist.num_classes() < 2 || dist.total() <= 10.0 {
        return false;
    }
    (dist.prob(0) - dist.prob(1)).abs() <= 0.2
}

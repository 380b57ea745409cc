mod entropy;
mod gain_ratio_split_criterion;
mod info_gain_split_criterion;
mod xor_guard;

pub use entropy::{log_func, new_ent, old_ent, split_ent};
pub use gain_ratio_split_criterion::gain_ratio;
pub use info_gain_split_criterion::{info_gain, info_gain_with_old_ent};
pub use xor_guard::xor_guard_triggered;

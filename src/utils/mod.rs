pub mod math;
pub mod stats;

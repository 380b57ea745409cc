pub mod classifiers;
pub mod config;
pub mod core;
pub mod replication;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

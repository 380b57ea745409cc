mod build;
mod error;
mod loader;
mod params;

pub use error::BuildError;
pub use loader::{load_options, load_params, read_params};
pub use params::{
    AttributeSamplingChoice, AttributeSamplingKind, CriterionChoice, CriterionKind,
    FixedSamplingParams, NoParams, OrdinalTreeParams,
};

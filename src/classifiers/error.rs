use crate::config::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("cannot build a meaningful model: {0}")]
    CannotBuild(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("class attribute `{0}` is not nominal")]
    ClassNotNominal(String),

    #[error("attribute index {index} out of bounds for {len} attributes")]
    AttributeIndexOutOfBounds { index: usize, len: usize },

    #[error("model has not been built")]
    ModelNotBuilt,

    #[error("measure `{0}` is not supported")]
    UnknownMeasure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Build(#[from] BuildError),
}

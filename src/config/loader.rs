use crate::classifiers::ordinal_tree::OrdinalTreeOptions;
use crate::config::BuildError;
use crate::config::params::OrdinalTreeParams;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parses parameters from JSON; absent fields take their defaults.
pub fn read_params<R: Read>(reader: R) -> Result<OrdinalTreeParams, BuildError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_params(path: impl AsRef<Path>) -> Result<OrdinalTreeParams> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_params(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}

/// Loads and validates parameters in one step.
pub fn load_options(path: impl AsRef<Path>) -> Result<OrdinalTreeOptions> {
    let path = path.as_ref();
    let params = load_params(path)?;
    OrdinalTreeOptions::try_from(params).with_context(|| format!("validating {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::ordinal_tree::{AttributeSampling, OptimizationCriterion, PruningStrategy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_partial_json_with_defaults() {
        let file = write_json(
            r#"{
                "min_num_obj": 5,
                "reduced_error_pruning": true,
                "optimization_criterion": {"type": "min", "params": {}},
                "attribute_sampling": {"type": "log2", "params": {}}
            }"#,
        );
        let params = load_params(file.path()).unwrap();
        assert_eq!(params.min_num_obj, 5);
        assert_eq!(params.seed, 1);

        let options = load_options(file.path()).unwrap();
        assert_eq!(options.pruning, PruningStrategy::ReducedError { num_folds: 3 });
        assert_eq!(options.optimization_criterion, OptimizationCriterion::Min);
        assert_eq!(options.attribute_sampling, AttributeSampling::Log2);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_params(&path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = read_params("{ not json".as_bytes()).unwrap_err();
        assert!(matches!(err, BuildError::Json(_)));

        let file = write_json("[1, 2]");
        assert!(load_params(file.path()).is_err());
    }

    #[test]
    fn invalid_settings_fail_validation() {
        let file = write_json(r#"{"unpruned": true, "confidence_factor": 0.3}"#);
        assert!(load_params(file.path()).is_ok());
        let err = load_options(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid parameter"));
    }
}

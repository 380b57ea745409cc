use crate::classifiers::ordinal_tree::{
    AttributeSampling, OptimizationCriterion, OrdinalTree, OrdinalTreeOptions, PruningStrategy,
};
use crate::config::BuildError;
use crate::config::params::{
    AttributeSamplingChoice, DEFAULT_CONFIDENCE_FACTOR, DEFAULT_NUM_FOLDS, OrdinalTreeParams,
};

fn pruning_strategy(params: &OrdinalTreeParams) -> Result<PruningStrategy, BuildError> {
    if let Some(cf) = params.confidence_factor {
        if !(cf > 0.0 && cf < 1.0) {
            return Err(BuildError::InvalidParameter(format!(
                "confidence factor must lie in (0, 1), got {cf}"
            )));
        }
        if params.reduced_error_pruning {
            return Err(BuildError::InvalidParameter(
                "confidence factor cannot be combined with reduced-error pruning".into(),
            ));
        }
        if params.unpruned {
            return Err(BuildError::InvalidParameter(
                "confidence factor has no effect on an unpruned tree".into(),
            ));
        }
    }
    if params.unpruned && params.reduced_error_pruning {
        return Err(BuildError::InvalidParameter(
            "an unpruned tree cannot use reduced-error pruning".into(),
        ));
    }
    if params.unpruned && !params.subtree_raising {
        return Err(BuildError::InvalidParameter(
            "subtree raising does not need to be disabled on an unpruned tree".into(),
        ));
    }
    if let Some(folds) = params.num_folds {
        if !params.reduced_error_pruning {
            return Err(BuildError::InvalidParameter(
                "number of folds only applies to reduced-error pruning".into(),
            ));
        }
        if folds < 2 {
            return Err(BuildError::InvalidParameter(format!(
                "reduced-error pruning needs at least 2 folds, got {folds}"
            )));
        }
    }

    Ok(if params.unpruned {
        PruningStrategy::Unpruned
    } else if params.reduced_error_pruning {
        PruningStrategy::ReducedError {
            num_folds: params.num_folds.unwrap_or(DEFAULT_NUM_FOLDS),
        }
    } else {
        PruningStrategy::Confidence {
            confidence_factor: params.confidence_factor.unwrap_or(DEFAULT_CONFIDENCE_FACTOR),
            subtree_raising: params.subtree_raising,
        }
    })
}

impl TryFrom<OrdinalTreeParams> for OrdinalTreeOptions {
    type Error = BuildError;

    fn try_from(params: OrdinalTreeParams) -> Result<Self, Self::Error> {
        let pruning = pruning_strategy(&params)?;
        let attribute_sampling = match &params.attribute_sampling {
            AttributeSamplingChoice::All(_) => AttributeSampling::All,
            AttributeSamplingChoice::Log2(_) => AttributeSampling::Log2,
            AttributeSamplingChoice::Fixed(p) => AttributeSampling::Fixed(p.count),
        };

        Ok(OrdinalTreeOptions {
            min_num_obj: params.min_num_obj,
            use_mdl_correction: params.use_mdl_correction,
            use_laplace: params.use_laplace,
            collapse_tree: params.collapse_tree,
            pruning,
            save_instance_data: params.save_instance_data,
            seed: params.seed,
            data_rep_s: params.data_rep_s,
            optimization_criterion: OptimizationCriterion::from(&params.optimization_criterion),
            frank_hall_distribution: params.frank_hall_distribution,
            attribute_sampling,
            max_depth: params.max_depth,
        })
    }
}

impl TryFrom<OrdinalTreeParams> for OrdinalTree {
    type Error = BuildError;

    fn try_from(params: OrdinalTreeParams) -> Result<Self, Self::Error> {
        Ok(OrdinalTree::new(OrdinalTreeOptions::try_from(params)?))
    }
}

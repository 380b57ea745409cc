use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Rule folding per-replica split scores into the single value used to rank
/// candidate splits. Inactive replicas are ignored by every rule.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OptimizationCriterion {
    /// Sum of the active scores over the number of replicas, so a split
    /// that is inactive in some replicas ranks below one active in all.
    #[default]
    Sum,
    /// Mean of the active scores.
    Average,
    /// Probabilistic OR: `1 - prod(1 - v)`.
    Product,
    GeometricMean,
    Min,
    Max,
    EuclideanMin,
    EuclideanMax,
}

impl OptimizationCriterion {
    pub fn combine(&self, values: &[f64], active: &[bool]) -> f64 {
        let active_values = || {
            values
                .iter()
                .zip(active)
                .filter(|(_, on)| **on)
                .map(|(v, _)| *v)
        };
        let n = active_values().count();

        match self {
            OptimizationCriterion::Sum => {
                if values.is_empty() {
                    0.0
                } else {
                    active_values().sum::<f64>() / values.len() as f64
                }
            }
            OptimizationCriterion::Average => {
                if n == 0 {
                    0.0
                } else {
                    active_values().sum::<f64>() / n as f64
                }
            }
            OptimizationCriterion::Product => {
                1.0 - active_values().map(|v| 1.0 - v).product::<f64>()
            }
            OptimizationCriterion::GeometricMean => {
                if n == 0 {
                    0.0
                } else {
                    active_values().product::<f64>().powf(1.0 / n as f64)
                }
            }
            OptimizationCriterion::Min => active_values().reduce(f64::min).unwrap_or(0.0),
            OptimizationCriterion::Max => active_values().fold(0.0, f64::max),
            OptimizationCriterion::EuclideanMin => {
                active_values().map(|v| v * v).sum::<f64>().sqrt()
            }
            OptimizationCriterion::EuclideanMax => {
                if n == 0 {
                    return 0.0;
                }
                let far: f64 = active_values().map(|v| (1.0 - v) * (1.0 - v)).sum();
                (values.len() as f64).sqrt() - far.sqrt()
            }
        }
    }
}

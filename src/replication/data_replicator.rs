//! Ordinal-to-binary data replication.
//!
//! A K-class ordinal problem becomes K-1 binary replicas: replica `i` asks
//! whether the ordinal label is above `i`. Stacked replicas share one header
//! laid out as `[original non-class attributes.., binary_label, rep0..rep{K-3}]`;
//! replica `i > 0` sets marker `rep{i-1}` and replica 0 leaves every marker at 0.

use crate::classifiers::ClassifierError;
use crate::classifiers::ordinal_tree::distribution::Distribution;
use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::dataset::Dataset;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::replication::CostMatrix;
use std::iter;
use std::sync::Arc;
use tracing::warn;

pub const BINARY_LABEL_NAME: &str = "binary_label";
pub const MARKER_PREFIX: &str = "rep";

fn ordinal_class_count(header: &InstanceHeader) -> Result<usize, ClassifierError> {
    let class_index = header.class_index();
    match header.num_values(class_index) {
        Some(k) => Ok(k),
        None => Err(ClassifierError::ClassNotNominal(
            header
                .class_attribute()
                .map(|a| a.name())
                .unwrap_or_default(),
        )),
    }
}

fn replica_header(source: &InstanceHeader, num_markers: usize) -> Arc<InstanceHeader> {
    let source_class = source.class_index();
    let mut attributes: Vec<AttributeRef> = source
        .attributes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != source_class)
        .map(|(_, attribute)| Arc::clone(attribute))
        .collect();
    let class_index = attributes.len();

    attributes.push(Arc::new(NominalAttribute::from_labels(
        BINARY_LABEL_NAME.into(),
        ["0", "1"],
    )));
    for k in 0..num_markers {
        attributes.push(Arc::new(NumericAttribute::new(format!("{MARKER_PREFIX}{k}"))));
    }
    Arc::new(InstanceHeader::new(
        source.relation_name().to_string(),
        attributes,
        class_index,
    ))
}

/// Lin–Li weight of one row for replica `replica`, `None` when the cost matrix
/// cannot supply both adjacent entries.
fn lin_li_weight(matrix: &CostMatrix, old_class: f64, replica: usize, num_classes: usize) -> Option<f64> {
    if !(old_class >= 0.0) {
        return None;
    }
    let row = old_class as usize;
    let here = matrix.get(row, replica)?;
    let next = matrix.get(row, replica + 1)?;
    let weight = (num_classes - 1) as f64 * (here - next).abs();
    weight.is_finite().then_some(weight)
}

/// Weight of row `j` in replica `replica`, and whether its cost matrix was
/// present but unusable. Rows past the end of `cost` keep their weight
/// without being flagged.
fn replica_row_weight(
    cost: Option<&[CostMatrix]>,
    j: usize,
    row_weight: f64,
    old_class: f64,
    replica: usize,
    num_classes: usize,
) -> (f64, bool) {
    let Some(matrix) = cost.and_then(|matrices| matrices.get(j)) else {
        return (row_weight, false);
    };
    match lin_li_weight(matrix, old_class, replica, num_classes) {
        Some(weight) => (weight, false),
        None => (row_weight, true),
    }
}

/// Builds the K-1 binary replicas of `data` without stacking them.
///
/// With `s > 0`, replica `i` only keeps rows whose ordinal label lies in
/// `[i - s, i + s]`. `cost`, when given, holds one matrix per row of `data`
/// and switches row weights to Lin–Li weights; rows whose matrix cannot be
/// used keep their weight.
pub fn frank_hall(
    data: &Dataset,
    s: usize,
    cost: Option<&[CostMatrix]>,
) -> Result<Vec<Dataset>, ClassifierError> {
    let num_classes = ordinal_class_count(data.header())?;
    let class_index = data.class_index();
    let header = replica_header(data.header(), 0);

    if let Some(matrices) = cost {
        if matrices.len() != data.len() {
            warn!(
                matrices = matrices.len(),
                rows = data.len(),
                "cost matrix count does not match row count"
            );
        }
    }

    let mut replicas = Vec::with_capacity(num_classes.saturating_sub(1));
    for i in 0..num_classes.saturating_sub(1) {
        let mut replica = Dataset::with_capacity(Arc::clone(&header), data.len());
        let (low, high) = (i as f64 - s as f64, (i + s) as f64);
        let mut unusable = 0usize;

        for (j, row) in data.iter().enumerate() {
            let old_class = row.values[class_index];
            if s > 0 && (old_class < low || old_class > high) {
                continue;
            }

            let (weight, flagged) = replica_row_weight(cost, j, row.weight, old_class, i, num_classes);
            if flagged {
                unusable += 1;
            }

            let label = if old_class <= i as f64 { 0.0 } else { 1.0 };
            let values: Vec<f64> = row
                .values
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != class_index)
                .map(|(_, v)| *v)
                .chain(iter::once(label))
                .collect();
            replica.push_values(values, weight)?;
        }
        if unusable > 0 {
            warn!(replica = i, rows = unusable, "cost matrix unusable, keeping row weights");
        }
        replicas.push(replica);
    }
    Ok(replicas)
}

/// Replicates `data` and stacks the replicas behind marker attributes.
pub fn replicate_data(
    data: &Dataset,
    s: usize,
    cost: Option<&[CostMatrix]>,
) -> Result<Dataset, ClassifierError> {
    let replicas = frank_hall(data, s, cost)?;
    let num_markers = replicas.len().saturating_sub(1);
    let header = replica_header(data.header(), num_markers);
    let mut stacked = Dataset::with_capacity(header, replicas.iter().map(Dataset::len).sum());

    for (i, replica) in replicas.iter().enumerate() {
        for row in replica {
            let markers = (0..num_markers).map(|k| if i > 0 && k == i - 1 { 1.0 } else { 0.0 });
            let values: Vec<f64> = row.values.iter().copied().chain(markers).collect();
            stacked.push_values(values, row.weight)?;
        }
    }
    Ok(stacked)
}

/// The K-1 stacked rows of a single, possibly unlabelled, instance.
pub fn replicate_instance(instance: &dyn Instance) -> Result<Dataset, ClassifierError> {
    let mut single = Dataset::new(Arc::new(instance.header().clone()));
    single.push_values(instance.to_vec(), instance.weight())?;
    replicate_data(&single, 0, None)
}

/// Undoes the stacking: one dataset per replica, in replica order.
pub fn split_replicas(data: &Dataset) -> Vec<Dataset> {
    (0..get_num_replicas(data.header()))
        .map(|replica| data.filtered(|row| get_instance_replica(row) == replica))
        .collect()
}

/// Keeps attribute `att_index`, the binary class and the markers.
pub fn project_instances(data: &Dataset, att_index: usize) -> Result<Dataset, ClassifierError> {
    let class_index = data.class_index();
    if att_index >= class_index {
        return Err(ClassifierError::AttributeIndexOutOfBounds {
            index: att_index,
            len: class_index,
        });
    }

    let keep: Vec<usize> = iter::once(att_index)
        .chain(class_index..data.num_attributes())
        .collect();
    let source = data.header();
    let header = Arc::new(InstanceHeader::new(
        source.relation_name().to_string(),
        keep.iter().map(|&a| Arc::clone(&source.attributes[a])).collect(),
        1,
    ));

    let mut projected = Dataset::with_capacity(header, data.len());
    for row in data {
        projected.push_values(keep.iter().map(|&a| row.values[a]).collect(), row.weight)?;
    }
    Ok(projected)
}

pub fn get_distributions(replicas: &[Dataset]) -> Vec<Distribution> {
    replicas
        .iter()
        .map(|replica| Distribution::from_instances(replica.iter(), replica.num_classes()))
        .collect()
}

/// Turns per-replica `P(y > i)` into per-class probabilities.
///
/// Negative differences caused by non-monotone inputs are clipped to zero and
/// the result is not renormalised.
pub fn get_classification_frank_hall(prob: &[f64]) -> Vec<f64> {
    let Some((&first, &last)) = prob.first().zip(prob.last()) else {
        return vec![1.0];
    };
    let mut dist = vec![0.0; prob.len() + 1];
    dist[0] = 1.0 - first;
    dist[prob.len()] = last;
    for i in 1..prob.len() {
        dist[i] = (prob[i - 1] - prob[i]).max(0.0);
    }
    dist
}

/// Ordinal label as the number of replicas voting "above".
pub fn get_classification_lin_li(prob: &[f64]) -> usize {
    prob.iter().filter(|&&p| p >= 0.5).count()
}

pub fn get_num_replicas(header: &InstanceHeader) -> usize {
    header.number_of_attributes() - header.class_index()
}

/// Replica a stacked row belongs to, read from its first set marker.
pub fn get_instance_replica(instance: &dyn Instance) -> usize {
    let class_index = instance.class_index();
    (class_index + 1..instance.number_of_attributes())
        .find(|&a| instance.value_at_index(a) == Some(1.0))
        .map_or(0, |a| a - class_index)
}

pub fn is_data_replicated(header: &InstanceHeader) -> bool {
    header.number_of_classes() <= 2
}

/// Schema of the ordinal data that `header` was stacked from, or `None` when
/// `header` is not a stacked layout (binary class followed only by numeric
/// `rep{k}` markers). The rebuilt class is labelled by rank.
pub fn stacked_source_header(header: &InstanceHeader) -> Option<Arc<InstanceHeader>> {
    let class_index = header.class_index();
    if !header.is_nominal(class_index) || !is_data_replicated(header) {
        return None;
    }
    let markers = header.attributes.get(class_index + 1..)?;
    let is_marker = |k: usize, attribute: &AttributeRef| {
        attribute.name() == format!("{MARKER_PREFIX}{k}") && !header.is_nominal(class_index + 1 + k)
    };
    if !markers.iter().enumerate().all(|(k, a)| is_marker(k, a)) {
        return None;
    }
    if markers.is_empty() {
        return Some(Arc::new(header.clone()));
    }

    let num_classes = markers.len() + 2;
    let mut attributes: Vec<AttributeRef> = header.attributes[..class_index].to_vec();
    attributes.push(Arc::new(NominalAttribute::from_labels(
        "class".into(),
        (0..num_classes).map(|c| c.to_string()),
    )));
    Some(Arc::new(InstanceHeader::new(
        header.relation_name().to_string(),
        attributes,
        class_index,
    )))
}

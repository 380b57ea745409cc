use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use std::sync::Arc;

fn class_attribute(num_classes: usize) -> AttributeRef {
    Arc::new(NominalAttribute::from_labels(
        "class".into(),
        (0..num_classes).map(|c| format!("c{c}")),
    ))
}

/// `x` numeric, `colour` nominal {r, g}, then an ordinal class with `num_classes` labels.
pub fn header_ordinal(num_classes: usize) -> Arc<InstanceHeader> {
    let attributes: Vec<AttributeRef> = vec![
        Arc::new(NumericAttribute::new("x".into())),
        Arc::new(NominalAttribute::from_labels("colour".into(), ["r", "g"])),
        class_attribute(num_classes),
    ];
    Arc::new(InstanceHeader::new("ordinal".into(), attributes, 2))
}

/// A single numeric attribute `x` followed by the class.
pub fn header_single_numeric(num_classes: usize) -> Arc<InstanceHeader> {
    let attributes: Vec<AttributeRef> = vec![
        Arc::new(NumericAttribute::new("x".into())),
        class_attribute(num_classes),
    ];
    Arc::new(InstanceHeader::new("bands".into(), attributes, 1))
}

/// Class first, then a nominal `shape` attribute with `num_shapes` values.
pub fn header_class_first(num_classes: usize, num_shapes: usize) -> Arc<InstanceHeader> {
    let attributes: Vec<AttributeRef> = vec![
        class_attribute(num_classes),
        Arc::new(NominalAttribute::from_labels(
            "shape".into(),
            (0..num_shapes).map(|s| format!("s{s}")),
        )),
    ];
    Arc::new(InstanceHeader::new("shapes".into(), attributes, 0))
}

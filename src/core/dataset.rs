use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use std::cmp::Ordering;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// An ordered collection of rows sharing one [`InstanceHeader`].
///
/// Rows are owned; every row stored here carries the dataset's header. The
/// class attribute is whatever the header designates.
#[derive(Debug, Clone)]
pub struct Dataset {
    header: Arc<InstanceHeader>,
    instances: Vec<DenseInstance>,
}

impl Dataset {
    pub fn new(header: Arc<InstanceHeader>) -> Self {
        Self {
            header,
            instances: Vec::new(),
        }
    }

    pub fn with_capacity(header: Arc<InstanceHeader>, capacity: usize) -> Self {
        Self {
            header,
            instances: Vec::with_capacity(capacity),
        }
    }

    /// Empty dataset with the same header.
    pub fn empty_copy(&self) -> Self {
        Self::new(Arc::clone(&self.header))
    }

    pub fn header(&self) -> &InstanceHeader {
        &self.header
    }

    pub fn header_arc(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    /// Appends a row given as raw values, binding it to this dataset's header.
    pub fn push_values(&mut self, values: Vec<f64>, weight: f64) -> Result<(), Error> {
        let instance = DenseInstance::new(Arc::clone(&self.header), values, weight);
        self.push(instance)
    }

    pub fn push(&mut self, instance: DenseInstance) -> Result<(), Error> {
        if instance.values.len() != self.header.number_of_attributes() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "row has {} values but the header declares {} attributes",
                    instance.values.len(),
                    self.header.number_of_attributes()
                ),
            ));
        }
        if instance.weight < 0.0 || instance.weight.is_nan() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Weight cannot be negative",
            ));
        }
        let instance = if Arc::ptr_eq(&instance.header, &self.header) {
            instance
        } else {
            instance.with_header(Arc::clone(&self.header))
        };
        self.instances.push(instance);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DenseInstance> {
        self.instances.get(index)
    }

    pub fn instances(&self) -> &[DenseInstance] {
        &self.instances
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DenseInstance> {
        self.instances.iter()
    }

    pub fn class_index(&self) -> usize {
        self.header.class_index()
    }

    pub fn num_attributes(&self) -> usize {
        self.header.number_of_attributes()
    }

    pub fn num_classes(&self) -> usize {
        self.header.number_of_classes()
    }

    pub fn sum_of_weights(&self) -> f64 {
        self.instances.iter().map(|i| i.weight).sum()
    }

    /// Stable sort on one attribute; rows missing that attribute go last.
    pub fn sort_by_attribute(&mut self, att_index: usize) {
        self.instances.sort_by(|a, b| {
            let va = a.values.get(att_index).copied().unwrap_or(f64::NAN);
            let vb = b.values.get(att_index).copied().unwrap_or(f64::NAN);
            match (va.is_nan(), vb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => va.partial_cmp(&vb).unwrap_or(Ordering::Equal),
            }
        });
    }

    pub fn delete_with_missing_class(&mut self) {
        self.instances.retain(|i| !i.is_class_missing());
    }

    /// Copy holding the rows accepted by `keep`.
    pub fn filtered<F: FnMut(&DenseInstance) -> bool>(&self, mut keep: F) -> Dataset {
        Dataset {
            header: Arc::clone(&self.header),
            instances: self.instances.iter().filter(|i| keep(i)).cloned().collect(),
        }
    }

    pub fn retain<F: FnMut(&DenseInstance) -> bool>(&mut self, f: F) {
        self.instances.retain(f);
    }

    pub fn into_instances(self) -> Vec<DenseInstance> {
        self.instances
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DenseInstance;
    type IntoIter = std::slice::Iter<'a, DenseInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

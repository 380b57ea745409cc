use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::instance::Instance;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DenseInstance {
    pub header: Arc<InstanceHeader>,
    pub values: Vec<f64>,
    pub weight: f64,
}

impl DenseInstance {
    pub fn new(header: Arc<InstanceHeader>, values: Vec<f64>, weight: f64) -> DenseInstance {
        DenseInstance {
            header,
            values,
            weight,
        }
    }

    pub fn header_arc(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    /// Copy of this row bound to another header, keeping values and weight.
    pub fn with_header(&self, header: Arc<InstanceHeader>) -> DenseInstance {
        DenseInstance::new(header, self.values.clone(), self.weight)
    }
}

impl Instance for DenseInstance {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, new_value: f64) -> Result<(), Error> {
        if new_value < 0.0 || new_value.is_nan() {
            Err(Error::new(
                ErrorKind::InvalidInput,
                "Weight cannot be negative",
            ))
        } else {
            self.weight = new_value;
            Ok(())
        }
    }

    fn value_at_index(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn set_value_at_index(&mut self, index: usize, new_value: f64) -> Result<(), Error> {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = new_value;
                Ok(())
            }
            None => Err(Error::new(ErrorKind::InvalidInput, "Index out of bounds")),
        }
    }

    fn is_missing_at_index(&self, index: usize) -> Result<bool, Error> {
        self.values
            .get(index)
            .map(|v| v.is_nan())
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Index out of bounds"))
    }

    fn attribute_at_index(&self, index: usize) -> Option<&dyn Attribute> {
        self.header.attribute_at_index(index)
    }

    fn number_of_attributes(&self) -> usize {
        self.header.number_of_attributes()
    }

    fn class_index(&self) -> usize {
        self.header.class_index()
    }

    fn class_value(&self) -> Option<f64> {
        self.values.get(self.header.class_index()).copied()
    }

    fn set_class_value(&mut self, new_value: f64) -> Result<(), Error> {
        let class_index = self.header.class_index();
        match self.values.get_mut(class_index) {
            Some(slot) => {
                *slot = new_value;
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::InvalidInput,
                "Class index out of bounds",
            )),
        }
    }

    fn is_class_missing(&self) -> bool {
        self.class_value().is_none_or(f64::is_nan)
    }

    fn number_of_classes(&self) -> usize {
        self.header.number_of_classes()
    }

    fn to_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dummies::header_ordinal;

    fn instance() -> DenseInstance {
        DenseInstance::new(header_ordinal(3), vec![1.5, f64::NAN, 2.0], 1.0)
    }

    #[test]
    fn rejects_negative_weight() {
        let mut inst = instance();
        assert!(inst.set_weight(-1.0).is_err());
        assert!(inst.set_weight(0.5).is_ok());
        assert_eq!(inst.weight(), 0.5);
    }

    #[test]
    fn missing_values_are_nan() {
        let inst = instance();
        assert!(!inst.is_missing_at_index(0).unwrap());
        assert!(inst.is_missing_at_index(1).unwrap());
        assert!(inst.is_missing_at_index(9).is_err());
    }

    #[test]
    fn class_accessors_use_header_class_index() {
        let mut inst = instance();
        assert_eq!(inst.class_index(), 2);
        assert_eq!(inst.class_value(), Some(2.0));
        assert_eq!(inst.number_of_classes(), 3);
        inst.set_class_value(f64::NAN).unwrap();
        assert!(inst.is_class_missing());
    }

    #[test]
    fn set_value_out_of_bounds_fails() {
        let mut inst = instance();
        assert!(inst.set_value_at_index(3, 1.0).is_err());
        inst.set_value_at_index(0, 4.0).unwrap();
        assert_eq!(inst.value_at_index(0), Some(4.0));
    }
}

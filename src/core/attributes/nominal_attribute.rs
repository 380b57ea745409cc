use crate::core::attributes::Attribute;
use std::any::Any;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct NominalAttribute {
    pub name: String,
    pub values: Vec<String>,
    pub label_to_index: HashMap<String, usize>,
}

impl NominalAttribute {
    pub fn new(name: String) -> NominalAttribute {
        NominalAttribute {
            name,
            values: Vec::new(),
            label_to_index: HashMap::new(),
        }
    }

    pub fn with_values(
        name: String,
        values: Vec<String>,
        label_to_index: HashMap<String, usize>,
    ) -> NominalAttribute {
        NominalAttribute {
            name,
            values,
            label_to_index,
        }
    }

    /// Builds the attribute from its ordered labels; the label map follows the order.
    pub fn from_labels<S: Into<String>>(name: String, labels: impl IntoIterator<Item = S>) -> Self {
        let values: Vec<String> = labels.into_iter().map(Into::into).collect();
        let label_to_index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();
        Self::with_values(name, values, label_to_index)
    }

    pub fn get_attribute_values(&self) -> Vec<String> {
        self.values.clone()
    }

    pub fn index_of_value(&self, v: &str) -> Option<usize> {
        self.label_to_index.get(v).copied()
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn enumerate_values(&self) -> impl Iterator<Item = (usize, &String)> {
        self.values.iter().enumerate()
    }
}

impl Attribute for NominalAttribute {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn arff_representation(&self) -> String {
        format!("@attribute {} {{ {} }}", self.name, self.values.join(", "))
    }

    fn num_values(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_labels_keeps_order_and_index() {
        let attr = NominalAttribute::from_labels("rating".into(), ["low", "mid", "high"]);
        assert_eq!(attr.num_values(), Some(3));
        assert_eq!(attr.index_of_value("mid"), Some(1));
        assert_eq!(attr.value(2), Some("high"));
        assert_eq!(attr.value(3), None);
        assert!(attr.is_nominal());
    }

    #[test]
    fn arff_lists_labels() {
        let attr = NominalAttribute::from_labels("c".into(), ["0", "1"]);
        assert_eq!(attr.arff_representation(), "@attribute c { 0, 1 }");
    }
}

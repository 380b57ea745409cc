use crate::core::attributes::{Attribute, AttributeRef, NominalAttribute};

#[derive(Clone)]
pub struct InstanceHeader {
    pub relation_name: String,
    pub attributes: Vec<AttributeRef>,
    pub class_index: usize,
}

impl InstanceHeader {
    pub fn new(
        relation_name: String,
        attributes: Vec<AttributeRef>,
        class_index: usize,
    ) -> InstanceHeader {
        InstanceHeader {
            relation_name,
            attributes,
            class_index,
        }
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn attribute_at_index(&self, index: usize) -> Option<&dyn Attribute> {
        self.attributes.get(index).map(|a| a.as_ref() as &dyn Attribute)
    }

    pub fn index_of_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|attr| attr.name() == name)
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn class_attribute(&self) -> Option<&dyn Attribute> {
        self.attribute_at_index(self.class_index)
    }

    pub fn is_nominal(&self, index: usize) -> bool {
        self.attribute_at_index(index)
            .is_some_and(|attr| attr.is_nominal())
    }

    pub fn num_values(&self, index: usize) -> Option<usize> {
        self.attribute_at_index(index)?.num_values()
    }

    pub fn nominal_attribute(&self, index: usize) -> Option<&NominalAttribute> {
        self.attribute_at_index(index)?
            .as_any()
            .downcast_ref::<NominalAttribute>()
    }

    /// Number of class labels, 0 when the class attribute is numeric or absent.
    pub fn number_of_classes(&self) -> usize {
        self.num_values(self.class_index).unwrap_or(0)
    }
}

impl std::fmt::Debug for InstanceHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceHeader")
            .field("relation_name", &self.relation_name)
            .field(
                "attributes",
                &self.attributes.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("class_index", &self.class_index)
            .finish()
    }
}

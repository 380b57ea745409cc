use std::any::Any;
use std::sync::Arc;

pub type AttributeRef = Arc<dyn Attribute + Send + Sync>;

pub trait Attribute: Any {
    fn name(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    fn arff_representation(&self) -> String;

    /// Number of distinct labels for nominal attributes, `None` otherwise.
    fn num_values(&self) -> Option<usize> {
        None
    }

    fn is_nominal(&self) -> bool {
        self.num_values().is_some()
    }

    fn is_numeric(&self) -> bool {
        !self.is_nominal()
    }
}

use crate::classifiers::ClassifierError;
use crate::core::dataset::Dataset;
use crate::core::instances::Instance;

pub trait Classifier {
    fn build_classifier(&mut self, data: &Dataset) -> Result<(), ClassifierError>;
    fn classify_instance(&self, instance: &dyn Instance) -> Result<usize, ClassifierError>;
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Result<Vec<f64>, ClassifierError>;
}

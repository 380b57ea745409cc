mod cost_matrix;
pub mod data_replicator;

pub use cost_matrix::CostMatrix;
pub use data_replicator::{
    BINARY_LABEL_NAME, MARKER_PREFIX, frank_hall, get_classification_frank_hall,
    get_classification_lin_li, get_distributions, get_instance_replica, get_num_replicas,
    is_data_replicated, project_instances, replicate_data, replicate_instance, split_replicas,
    stacked_source_header,
};

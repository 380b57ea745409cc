use crate::classifiers::ordinal_tree::model_selection::ModelSelection;
use crate::classifiers::ordinal_tree::nodes::{ClassifierTree, GrowOptions};
use crate::classifiers::ordinal_tree::options::{OrdinalTreeOptions, PruningStrategy};
use crate::classifiers::ordinal_tree::pruning::holdout_split;
use crate::classifiers::ordinal_tree::split_models::SplitSettings;
use crate::classifiers::{Classifier, ClassifierError};
use crate::core::dataset::Dataset;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::replication::{
    get_classification_frank_hall, replicate_data, replicate_instance, stacked_source_header,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Ordinal classifier growing one binary C4.5 tree over the data replicas.
#[derive(Debug, Clone)]
pub struct OrdinalTree {
    options: OrdinalTreeOptions,
    tree: Option<ClassifierTree>,
    source_header: Option<Arc<InstanceHeader>>,
}

impl Default for OrdinalTree {
    fn default() -> Self {
        Self::new(OrdinalTreeOptions::default())
    }
}

impl OrdinalTree {
    pub fn new(options: OrdinalTreeOptions) -> Self {
        Self {
            options,
            tree: None,
            source_header: None,
        }
    }

    pub fn options(&self) -> &OrdinalTreeOptions {
        &self.options
    }

    pub fn tree(&self) -> Option<&ClassifierTree> {
        self.tree.as_ref()
    }

    /// Builds from rows that were already replicated and stacked, e.g. with
    /// cost-matrix weights. `source_header` is the schema of the unreplicated
    /// data that predictions will receive.
    pub fn build_replicated_classifier(
        &mut self,
        replicated: &Dataset,
        source_header: Arc<InstanceHeader>,
    ) -> Result<(), ClassifierError> {
        let mut data = replicated.clone();
        data.delete_with_missing_class();
        if data.is_empty() {
            return Err(ClassifierError::CannotBuild(
                "every instance is missing its class".into(),
            ));
        }

        info!(
            relation = source_header.relation_name(),
            rows = data.len(),
            classes = source_header.number_of_classes(),
            "building ordinal tree"
        );
        let tree = self.grow_and_prune(data, source_header.number_of_attributes())?;
        info!(
            nodes = tree.num_nodes(),
            leaves = tree.num_leaves(),
            "ordinal tree built"
        );
        self.tree = Some(tree);
        self.source_header = Some(source_header);
        Ok(())
    }

    fn grow_and_prune(
        &self,
        data: Dataset,
        num_source_attributes: usize,
    ) -> Result<ClassifierTree, ClassifierError> {
        let options = &self.options;
        let settings = SplitSettings {
            min_no_obj: options.min_num_obj as f64,
            use_mdl_correction: options.use_mdl_correction,
            criterion: options.optimization_criterion,
        };
        let sample_size = options.attribute_sampling.resolve(num_source_attributes);
        let selection = ModelSelection::new(settings, sample_size, &data);
        let mut rng = StdRng::seed_from_u64(options.seed);

        let mut tree = match options.pruning {
            PruningStrategy::ReducedError { num_folds } => {
                let (grow, held) = holdout_split(&data, num_folds, &mut rng)?;
                let grow_options = GrowOptions {
                    max_depth: options.max_depth,
                    keep_data: options.save_instance_data,
                };
                let mut tree = ClassifierTree::grow(&selection, grow, Some(held), grow_options, &mut rng)?;
                tree.prune_reduced_error();
                tree
            }
            PruningStrategy::Unpruned | PruningStrategy::Confidence { .. } => {
                let raising = matches!(
                    options.pruning,
                    PruningStrategy::Confidence { subtree_raising: true, .. }
                );
                let grow_options = GrowOptions {
                    max_depth: options.max_depth,
                    keep_data: options.save_instance_data || raising,
                };
                let mut tree = ClassifierTree::grow(&selection, data.clone(), None, grow_options, &mut rng)?;
                if options.collapse_tree {
                    tree.collapse();
                }
                if let PruningStrategy::Confidence {
                    confidence_factor,
                    subtree_raising,
                } = options.pruning
                {
                    tree.prune(confidence_factor, subtree_raising)?;
                }
                tree
            }
        };

        if !options.save_instance_data {
            tree.cleanup();
        }
        tree.compact();
        Ok(tree)
    }

    fn built(&self) -> Result<(&ClassifierTree, &InstanceHeader), ClassifierError> {
        match (&self.tree, &self.source_header) {
            (Some(tree), Some(header)) => Ok((tree, header)),
            _ => Err(ClassifierError::ModelNotBuilt),
        }
    }

    fn replicas_of(&self, instance: &dyn Instance) -> Result<Dataset, ClassifierError> {
        let (_, header) = self.built()?;
        if instance.number_of_attributes() != header.number_of_attributes()
            || instance.class_index() != header.class_index()
        {
            return Err(ClassifierError::SchemaMismatch(format!(
                "instance has {} attributes with class at {}, model expects {} with class at {}",
                instance.number_of_attributes(),
                instance.class_index(),
                header.number_of_attributes(),
                header.class_index()
            )));
        }
        replicate_instance(instance)
    }

    /// `P(y > i)` for every replica `i` of `instance`.
    pub fn distribution_for_multiclass_instance(
        &self,
        instance: &dyn Instance,
    ) -> Result<Vec<f64>, ClassifierError> {
        let (tree, _) = self.built()?;
        let replicas = self.replicas_of(instance)?;
        Ok(replicas
            .iter()
            .map(|row| tree.get_probs(1, row, self.options.use_laplace))
            .collect())
    }

    pub fn num_nodes(&self) -> usize {
        self.tree.as_ref().map_or(0, ClassifierTree::num_nodes)
    }

    pub fn num_leaves(&self) -> usize {
        self.tree.as_ref().map_or(0, ClassifierTree::num_leaves)
    }

    /// Named size measure; names are matched case-insensitively.
    pub fn measure(&self, name: &str) -> Result<f64, ClassifierError> {
        match name.to_ascii_lowercase().as_str() {
            "measuretreesize" => Ok(self.num_nodes() as f64),
            "measurenumleaves" | "measurenumrules" => Ok(self.num_leaves() as f64),
            _ => Err(ClassifierError::UnknownMeasure(name.to_string())),
        }
    }

    pub fn measure_names() -> &'static [&'static str] {
        &["measureTreeSize", "measureNumLeaves", "measureNumRules"]
    }

    pub fn summary(&self) -> String {
        format!(
            "Number of leaves: {}\nSize of the tree: {}\n",
            self.num_leaves(),
            self.num_nodes()
        )
    }
}

impl Classifier for OrdinalTree {
    fn build_classifier(&mut self, data: &Dataset) -> Result<(), ClassifierError> {
        if data.num_attributes() < 2 {
            return Err(ClassifierError::CannotBuild(
                "dataset holds only the class attribute".into(),
            ));
        }
        if let Some(source_header) = stacked_source_header(data.header()) {
            return self.build_replicated_classifier(data, source_header);
        }
        let mut labelled = data.clone();
        labelled.delete_with_missing_class();
        if labelled.is_empty() {
            return Err(ClassifierError::CannotBuild(
                "every instance is missing its class".into(),
            ));
        }

        let replicated = replicate_data(&labelled, self.options.data_rep_s, None)?;
        self.build_replicated_classifier(&replicated, Arc::clone(data.header_arc()))
    }

    /// Number of replicas voting "above" for `instance`.
    fn classify_instance(&self, instance: &dyn Instance) -> Result<usize, ClassifierError> {
        let (tree, _) = self.built()?;
        let replicas = self.replicas_of(instance)?;
        Ok(replicas
            .iter()
            .map(|row| tree.classify_replica(row, self.options.use_laplace))
            .sum())
    }

    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Result<Vec<f64>, ClassifierError> {
        let (_, header) = self.built()?;
        if self.options.frank_hall_distribution {
            let above = self.distribution_for_multiclass_instance(instance)?;
            return Ok(get_classification_frank_hall(&above));
        }
        let mut votes = vec![0.0; header.number_of_classes()];
        let class = self.classify_instance(instance)?;
        if let Some(slot) = votes.get_mut(class) {
            *slot = 1.0;
        }
        Ok(votes)
    }
}

impl fmt::Display for OrdinalTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(tree) = &self.tree else {
            return write!(f, "No classifier built");
        };
        let kind = if self.options.pruning.is_pruned() {
            "pruned"
        } else {
            "unpruned"
        };
        writeln!(f, "Ordinal {kind} tree")?;
        writeln!(f, "------------------")?;
        write!(f, "{tree}")?;
        write!(
            f,
            "\n\nNumber of Leaves  : \t{}\n\nSize of the tree : \t{}\n",
            tree.num_leaves(),
            tree.num_nodes()
        )
    }
}

//! Active model: one of the three interchangeable classifiers

use enose_core::{ClassId, Classifier, Component, FeatureVector, ModelKind};

use crate::forest::RandomForest;
use crate::linear::LinearSvm;
use crate::tree::DecisionTree;

/// Tagged variant over the three model families.
///
/// Chosen once (from configuration or an artifact) and then only read.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Tree(DecisionTree),
    Forest(RandomForest),
    LinearSvm(LinearSvm),
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Tree(_) => ModelKind::DecisionTree,
            Model::Forest(_) => ModelKind::RandomForest,
            Model::LinearSvm(_) => ModelKind::LinearSvm,
        }
    }

    /// SVM margin; `None` for tree models
    pub fn decision_value(&self, features: &FeatureVector) -> Option<f32> {
        match self {
            Model::LinearSvm(svm) => Some(svm.decision_value(features)),
            Model::Tree(_) | Model::Forest(_) => None,
        }
    }

    /// Per-class votes; `None` unless the model is a forest
    pub fn votes(&self, features: &FeatureVector) -> Option<Vec<u32>> {
        match self {
            Model::Forest(forest) => Some(forest.votes(features)),
            Model::Tree(_) | Model::LinearSvm(_) => None,
        }
    }

    /// Short human summary used by `enose inspect`
    pub fn describe(&self) -> String {
        match self {
            Model::Tree(tree) => format!(
                "{}: {} nodes, {} leaves, depth {}",
                self.kind().name(),
                tree.node_count(),
                tree.leaf_count(),
                tree.depth()
            ),
            Model::Forest(forest) => {
                let depth = forest.trees().iter().map(DecisionTree::depth).max().unwrap_or(0);
                let nodes: usize = forest.trees().iter().map(DecisionTree::node_count).sum();
                format!(
                    "{}: {} trees, {} nodes total, max depth {}",
                    self.kind().name(),
                    forest.trees().len(),
                    nodes,
                    depth
                )
            }
            Model::LinearSvm(svm) => format!(
                "{}: {} weights, bias {:.8}",
                self.kind().name(),
                svm.weights().len(),
                svm.bias()
            ),
        }
    }
}

impl From<DecisionTree> for Model {
    fn from(tree: DecisionTree) -> Self {
        Model::Tree(tree)
    }
}

impl From<RandomForest> for Model {
    fn from(forest: RandomForest) -> Self {
        Model::Forest(forest)
    }
}

impl From<LinearSvm> for Model {
    fn from(svm: LinearSvm) -> Self {
        Model::LinearSvm(svm)
    }
}

impl Component for Model {
    fn name(&self) -> &str {
        match self {
            Model::Tree(tree) => tree.name(),
            Model::Forest(forest) => forest.name(),
            Model::LinearSvm(svm) => svm.name(),
        }
    }
}

impl Classifier for Model {
    fn predict(&self, features: &FeatureVector) -> ClassId {
        match self {
            Model::Tree(tree) => tree.predict(features),
            Model::Forest(forest) => forest.predict(features),
            Model::LinearSvm(svm) => svm.predict(features),
        }
    }

    fn n_classes(&self) -> usize {
        match self {
            Model::Tree(tree) => tree.n_classes(),
            Model::Forest(forest) => forest.n_classes(),
            Model::LinearSvm(svm) => Classifier::n_classes(svm),
        }
    }

    fn kind(&self) -> ModelKind {
        Model::kind(self)
    }
}

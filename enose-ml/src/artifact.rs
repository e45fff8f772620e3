//! # Model Artifacts
//!
//! Stable JSON encoding of a trained model plus its class table:
//!
//! ```json
//! { "format": "enose-artifact", "version": 1,
//!   "classes": ["PLANTA", "AR_NEUTRO"],
//!   "model": { "kind": "decision_tree", "nodes": [ ... ] } }
//! ```
//!
//! Deserializing only checks the JSON shape. [`Artifact::into_model`] runs
//! the full validation (format tag, version, array lengths, tree structure,
//! scaler deviations), so no invalid artifact ever becomes a [`Model`].

use std::fs;
use std::path::Path;

use enose_core::{ClassTable, EnoseError, EnoseResult, ModelKind, NUM_FEATURES};
use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};
use crate::forest::RandomForest;
use crate::linear::{LinearSvm, StandardScaler};
use crate::model::Model;
use crate::tree::{DecisionTree, TreeNode};

/// Value of the `format` field
pub const ARTIFACT_FORMAT: &str = "enose-artifact";

/// Schema version written by this crate
pub const ARTIFACT_VERSION: u32 = 1;

/// A serialized model and the names of its classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub format: String,
    pub version: u32,
    pub classes: ClassTable,
    pub model: ModelSpec,
}

/// Model parameters as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    DecisionTree {
        nodes: Vec<TreeNode>,
    },
    RandomForest {
        trees: Vec<TreeSpec>,
    },
    LinearSvm {
        weights: Vec<f32>,
        bias: f32,
        mean: Vec<f32>,
        std: Vec<f32>,
    },
}

/// One tree of a forest artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNode>,
}

impl ModelSpec {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelSpec::DecisionTree { .. } => ModelKind::DecisionTree,
            ModelSpec::RandomForest { .. } => ModelKind::RandomForest,
            ModelSpec::LinearSvm { .. } => ModelKind::LinearSvm,
        }
    }
}

impl From<&Model> for ModelSpec {
    fn from(model: &Model) -> Self {
        match model {
            Model::Tree(tree) => ModelSpec::DecisionTree {
                nodes: tree.nodes().to_vec(),
            },
            Model::Forest(forest) => ModelSpec::RandomForest {
                trees: forest
                    .trees()
                    .iter()
                    .map(|t| TreeSpec {
                        nodes: t.nodes().to_vec(),
                    })
                    .collect(),
            },
            Model::LinearSvm(svm) => ModelSpec::LinearSvm {
                weights: svm.weights().to_vec(),
                bias: svm.bias(),
                mean: svm.scaler().mean().to_vec(),
                std: svm.scaler().std().to_vec(),
            },
        }
    }
}

impl Artifact {
    /// Wraps an already validated model
    pub fn from_model(model: &Model, classes: ClassTable) -> Self {
        Self {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            classes,
            model: ModelSpec::from(model),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    /// Validates the artifact and builds the model.
    ///
    /// Tree and forest leaves are checked against the class table, so a
    /// tree artifact has exactly as many classes as it names.
    pub fn into_model(&self) -> EnoseResult<Model> {
        if self.format != ARTIFACT_FORMAT {
            return Err(EnoseError::malformed(format!(
                "unknown artifact format '{}' (expected '{ARTIFACT_FORMAT}')",
                self.format
            )));
        }
        if self.version != ARTIFACT_VERSION {
            return Err(EnoseError::malformed(format!(
                "unsupported artifact version {} (expected {ARTIFACT_VERSION})",
                self.version
            )));
        }

        let n_classes = self.classes.len();
        let model = match &self.model {
            ModelSpec::DecisionTree { nodes } => {
                DecisionTree::new(nodes.clone(), n_classes)?.into()
            }
            ModelSpec::RandomForest { trees } => {
                let trees = trees
                    .iter()
                    .enumerate()
                    .map(|(i, spec)| {
                        DecisionTree::new(spec.nodes.clone(), n_classes).map_err(|e| match e {
                            EnoseError::MalformedModel(msg) => {
                                EnoseError::malformed(format!("tree {i}: {msg}"))
                            }
                            other => other,
                        })
                    })
                    .collect::<EnoseResult<Vec<_>>>()?;
                RandomForest::new(trees, n_classes)?.into()
            }
            ModelSpec::LinearSvm {
                weights,
                bias,
                mean,
                std,
            } => {
                let scaler =
                    StandardScaler::new(fixed(mean, "mean")?, fixed(std, "std")?)?;
                LinearSvm::new(fixed(weights, "weights")?, *bias, scaler)?.into()
            }
        };

        tracing::debug!(kind = %self.kind(), classes = n_classes, "artifact validated");
        Ok(model)
    }

    /// Parses an artifact from JSON.
    ///
    /// Well-formed JSON with the wrong shape (missing fields, bad node
    /// objects, empty class table) is reported as `MalformedModel`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            if e.classify() == serde_json::error::Category::Data {
                MlError::Core(EnoseError::malformed(e.to_string()))
            } else {
                MlError::from(e)
            }
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| MlError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let artifact = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), kind = %artifact.kind(), "artifact loaded");
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json + "\n")
            .map_err(|e| MlError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Per-feature array of an SVM artifact
fn fixed(values: &[f32], field: &str) -> EnoseResult<[f32; NUM_FEATURES]> {
    values.try_into().map_err(|_| {
        EnoseError::malformed(format!(
            "linear_svm.{field} has {} values, expected {NUM_FEATURES}",
            values.len()
        ))
    })
}

//! # enose-ml - Gas Classification Models for the BME688 Electronic Nose
//!
//! Inference for three interchangeable model families over the nine ratio
//! features produced by `enose-core`.
//!
//! ## Features
//!
//! - **tree**: decision tree as a validated node table
//! - **forest**: five-tree random forest with majority vote
//! - **linear**: linear SVM with standard scaling and a signed margin
//! - **dispatch**: the single active model plus class names
//! - **artifact**: JSON model files, validated before use
//! - **reference**: bundled models for the PLANTA / AR_NEUTRO sessions
//! - **config**: `enose.toml`
//! - **dataset** / **evaluate**: recorded CSV sessions, accuracy, confusion matrix
//!
//! ```
//! use enose_ml::prelude::*;
//!
//! let nose = Dispatcher::reference(ModelKind::RandomForest)?;
//! let raw = RawReading::new([3.2, 2.9, 3.0, 2.8, 4.0, 6.5, 10.7, 18.5, 0.0, 6.0]);
//! assert_eq!(nose.classify_named(&raw)?, (ClassId(1), "AR_NEUTRO"));
//! # Ok::<(), EnoseError>(())
//! ```

pub mod error;
pub use error::{MlError, Result};

pub mod tree;
pub use tree::{DecisionTree, Preorder, TreeNode};

pub mod forest;
pub use forest::{FOREST_SIZE, RandomForest, majority_vote};

pub mod linear;
pub use linear::{LinearSvm, SVM_CLASSES, StandardScaler};

pub mod model;
pub use model::Model;

pub mod artifact;
pub use artifact::{ARTIFACT_FORMAT, ARTIFACT_VERSION, Artifact, ModelSpec, TreeSpec};

pub mod reference;

pub mod dispatch;
pub use dispatch::{BatchReport, Classification, Dispatcher};

pub mod config;
pub use config::{CONFIG_FILE, EnoseConfig};

pub mod dataset;
pub use dataset::{Sample, Session};

pub mod evaluate;
pub use evaluate::{ConfusionMatrix, Evaluation, evaluate};

/// Prelude module with common re-exports
pub mod prelude {
    pub use crate::artifact::Artifact;
    pub use crate::config::EnoseConfig;
    pub use crate::dispatch::{BatchReport, Classification, Dispatcher};
    pub use crate::error::{MlError, Result};
    pub use crate::forest::RandomForest;
    pub use crate::linear::{LinearSvm, StandardScaler};
    pub use crate::model::Model;
    pub use crate::tree::{DecisionTree, TreeNode};
    pub use enose_core::prelude::*;
}

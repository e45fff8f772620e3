//! # Reference Models
//!
//! The three models trained on the PLANTA / AR_NEUTRO sessions, bundled so
//! the engine works without an artifact file. They go through the same
//! validating constructors as any loaded artifact.
//!
//! Feature indices follow [`enose_core::FEATURE_NAMES`]
//! (`0 = R_G320` … `8 = R_G120`).

use enose_core::{ClassTable, EnoseResult, ModelKind};

use crate::forest::RandomForest;
use crate::linear::{LinearSvm, StandardScaler};
use crate::model::Model;
use crate::tree::{DecisionTree, Preorder};

use crate::tree::Preorder::{Leaf as L, Split as S};

/// Classes the reference models were trained on
pub const REFERENCE_CLASSES: usize = 2;

// ═══════════════════════════════════════════════════════════════════════════════
// TREES (pre-order: split, left subtree, right subtree)
// ═══════════════════════════════════════════════════════════════════════════════

/// Single tree, max depth 5
const DECISION_TREE: &[Preorder] = &[
    S(1, 0.020050),
        S(0, 0.012890),
            S(8, 0.635305),
                S(1, 0.019701),
                    L(1),
                    L(0),
                L(1),
            S(3, 0.043028),
                S(8, 0.642649),
                    S(5, 0.104626),
                        L(0),
                        L(1),
                    L(0),
                S(4, 0.066057),
                    L(1),
                    L(0),
        S(7, 0.310555),
            S(0, 0.013646),
                S(1, 0.020277),
                    S(6, 0.175683),
                        L(0),
                        L(1),
                    S(6, 0.179391),
                        L(0),
                        L(1),
                S(5, 0.108428),
                    S(8, 0.638287),
                        L(0),
                        L(1),
                    S(0, 0.013956),
                        L(0),
                        L(0),
            S(8, 0.645698),
                S(4, 0.073494),
                    L(0),
                    L(1),
                S(2, 0.015094),
                    L(1),
                    S(0, 0.013279),
                        L(1),
                        L(0),
];

const FOREST_TREE_0: &[Preorder] = &[
    S(2, 0.029225),
        S(8, 0.635623),
            S(6, 0.173142),
                L(1),
                L(0),
            S(2, 0.028874),
                L(1),
                S(5, 0.104354),
                    L(0),
                    L(1),
        S(5, 0.117207),
            S(1, 0.020913),
                S(1, 0.020289),
                    L(0),
                    L(0),
                S(8, 0.650790),
                    L(1),
                    L(0),
            S(8, 0.645706),
                L(1),
                S(0, 0.024930),
                    L(0),
                    L(0),
];

const FOREST_TREE_1: &[Preorder] = &[
    S(1, 0.019910),
        S(0, 0.012826),
            L(1),
            S(0, 0.012831),
                L(0),
                S(2, 0.028893),
                    L(1),
                    L(1),
        S(0, 0.013212),
            S(8, 0.651664),
                S(7, 0.303352),
                    L(1),
                    L(0),
                L(1),
            S(0, 0.013511),
                S(2, 0.030503),
                    L(0),
                    L(1),
                S(5, 0.108425),
                    L(1),
                    L(0),
];

const FOREST_TREE_2: &[Preorder] = &[
    S(6, 0.175186),
        S(2, 0.029138),
            S(0, 0.012806),
                L(1),
                S(8, 0.636160),
                    L(0),
                    L(1),
            S(7, 0.305946),
                S(1, 0.020341),
                    L(1),
                    L(0),
                L(0),
        S(0, 0.013115),
            S(7, 0.304873),
                S(8, 0.653679),
                    L(0),
                    L(1),
                S(3, 0.043070),
                    L(1),
                    L(1),
            S(7, 0.309919),
                S(2, 0.030533),
                    L(0),
                    L(1),
                S(0, 0.024997),
                    L(0),
                    L(1),
];

const FOREST_TREE_3: &[Preorder] = &[
    S(1, 0.019924),
        S(0, 0.012904),
            S(7, 0.300903),
                S(4, 0.066023),
                    L(1),
                    L(0),
                S(2, 0.028964),
                    L(1),
                    L(1),
            S(5, 0.104741),
                L(0),
                L(1),
        S(2, 0.029464),
            S(7, 0.308832),
                S(4, 0.065977),
                    L(1),
                    L(0),
                L(1),
            S(2, 0.030370),
                S(8, 0.651717),
                    L(0),
                    L(0),
                S(8, 0.645299),
                    L(1),
                    L(0),
];

const FOREST_TREE_4: &[Preorder] = &[
    S(6, 0.175292),
        S(2, 0.028962),
            S(2, 0.028868),
                L(1),
                S(1, 0.019706),
                    L(1),
                    L(0),
            S(7, 0.306573),
                S(5, 0.104582),
                    L(0),
                    L(1),
                L(0),
        S(0, 0.012998),
            S(1, 0.019939),
                L(1),
                S(2, 0.029245),
                    L(0),
                    L(1),
            S(7, 0.307389),
                S(3, 0.044259),
                    L(0),
                    L(1),
                S(7, 0.319646),
                    L(0),
                    L(0),
];

const FOREST: [&[Preorder]; 5] = [
    FOREST_TREE_0,
    FOREST_TREE_1,
    FOREST_TREE_2,
    FOREST_TREE_3,
    FOREST_TREE_4,
];

// ═══════════════════════════════════════════════════════════════════════════════
// LINEAR SVM
// ═══════════════════════════════════════════════════════════════════════════════

const SVM_WEIGHTS: [f32; 9] = [
    3.49160976, -1.00145950, -2.02520785, -2.82569044, 5.56164028, -2.23885858, -1.52696944,
    -0.42624243, 0.21297775,
];

const SVM_BIAS: f32 = -0.50875047;

const SCALER_MEAN: [f32; 9] = [
    0.01411359, 0.02163207, 0.03112135, 0.04540703, 0.06865733, 0.10867066, 0.17894018,
    0.30882462, 0.64590110,
];

const SCALER_STD: [f32; 9] = [
    0.00232593, 0.00326162, 0.00401661, 0.00447094, 0.00524255, 0.00574027, 0.00708913,
    0.00795405, 0.00683998,
];

pub fn decision_tree() -> EnoseResult<DecisionTree> {
    DecisionTree::from_preorder(DECISION_TREE, REFERENCE_CLASSES)
}

pub fn random_forest() -> EnoseResult<RandomForest> {
    let trees = FOREST
        .iter()
        .map(|ops| DecisionTree::from_preorder(ops, REFERENCE_CLASSES))
        .collect::<EnoseResult<Vec<_>>>()?;
    RandomForest::new(trees, REFERENCE_CLASSES)
}

pub fn linear_svm() -> EnoseResult<LinearSvm> {
    let scaler = StandardScaler::new(SCALER_MEAN, SCALER_STD)?;
    LinearSvm::new(SVM_WEIGHTS, SVM_BIAS, scaler)
}

/// Reference model of the given family
pub fn model(kind: ModelKind) -> EnoseResult<Model> {
    Ok(match kind {
        ModelKind::DecisionTree => decision_tree()?.into(),
        ModelKind::RandomForest => random_forest()?.into(),
        ModelKind::LinearSvm => linear_svm()?.into(),
    })
}

/// Class names of the reference models
pub fn class_table() -> ClassTable {
    ClassTable::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use enose_core::{ClassId, FeatureVector};

    #[test]
    fn test_reference_models_are_valid() {
        let tree = decision_tree().unwrap();
        assert_eq!(tree.node_count(), 41);
        assert_eq!(tree.leaf_count(), 21);
        assert_eq!(tree.depth(), 5);

        let forest = random_forest().unwrap();
        let sizes: Vec<_> = forest.trees().iter().map(DecisionTree::node_count).collect();
        assert_eq!(sizes, vec![23, 21, 27, 25, 25]);
        assert!(forest.trees().iter().all(|t| t.depth() <= 4));

        assert!(linear_svm().is_ok());
        assert_eq!(class_table().len(), REFERENCE_CLASSES);
    }

    #[test]
    fn test_reference_models_at_scaler_mean() {
        let x = FeatureVector::new(SCALER_MEAN);

        // R_G295 above 0.020050, then down the right half of the table
        let tree = decision_tree().unwrap();
        assert_eq!(tree.decision_path(&x), vec![0, 16, 17, 25, 29, 31]);
        assert_eq!(tree.predict(&x), ClassId(0));

        let forest = random_forest().unwrap();
        assert_eq!(forest.votes(&x), vec![3, 2]);
        assert_eq!(forest.predict(&x), ClassId(0));
    }

    #[test]
    fn test_reference_svm_at_mean_is_bias() {
        let svm = linear_svm().unwrap();
        let score = svm.decision_value(&FeatureVector::new(SCALER_MEAN));
        assert_eq!(score, SVM_BIAS);
    }
}

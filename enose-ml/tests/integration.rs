//! Integration tests for enose-ml

use std::sync::Arc;
use std::thread;

use enose_ml::prelude::*;
use enose_ml::{Session, evaluate, reference};

/// Raw reading of the "scenario A" sample (G100 = 6.0)
const SCENARIO_A: [f32; 10] = [3.2, 2.9, 3.0, 2.8, 4.0, 6.5, 10.7, 18.5, 0.0, 6.0];

/// Ratios within a fraction of a deviation of the scaler mean
const PLANT_LIKE: [f32; 10] = [
    1412.0, 2163.0, 3112.0, 4541.0, 6866.0, 10867.0, 17894.0, 30882.0, 64590.0, 100000.0,
];

/// PLANT_LIKE with G220 one deviation above its mean
const G220_HIGH: [f32; 10] = [
    1412.0, 2163.0, 3112.0, 4541.0, 7390.0, 10867.0, 17894.0, 30882.0, 64590.0, 100000.0,
];

fn all_reference() -> Vec<Dispatcher> {
    ModelKind::ALL
        .iter()
        .map(|&kind| Dispatcher::reference(kind).unwrap())
        .collect()
}

#[test]
fn test_scenario_a_is_deterministic() {
    let raw = RawReading::new(SCENARIO_A);
    let expected = [ClassId(1), ClassId(1), ClassId(0)];

    for (dispatcher, expected) in all_reference().iter().zip(expected) {
        for _ in 0..10 {
            assert_eq!(dispatcher.classify(&raw).unwrap(), expected, "{}", dispatcher.kind());
        }
    }
}

#[test]
fn test_scenario_b_zero_reference() {
    let mut values = SCENARIO_A;
    values[9] = 0.0;
    let raw = RawReading::new(values);

    for dispatcher in all_reference() {
        let err = dispatcher.classify(&raw).unwrap_err();
        assert_eq!(err, EnoseError::InvalidReference { value: 0.0 });
        assert!(err.is_per_call());
    }
}

#[test]
fn test_forest_votes_on_scenario_a() {
    let dispatcher = Dispatcher::reference(ModelKind::RandomForest).unwrap();
    let features = RawReading::new(SCENARIO_A).features().unwrap();

    assert_eq!(dispatcher.model().votes(&features), Some(vec![2, 3]));
    assert_eq!(dispatcher.classify_named(&RawReading::new(SCENARIO_A)).unwrap().1, "AR_NEUTRO");
}

#[test]
fn test_svm_margins() {
    let svm = Dispatcher::reference(ModelKind::LinearSvm).unwrap();

    let margin = svm.confidence(&RawReading::new(SCENARIO_A)).unwrap().unwrap();
    assert!((margin - (-125.598_19)).abs() < 1e-2, "margin = {margin}");

    let margin = svm.confidence(&RawReading::new(PLANT_LIKE)).unwrap().unwrap();
    assert!((margin - (-0.496_35)).abs() < 1e-3, "margin = {margin}");
    assert_eq!(svm.classify(&RawReading::new(PLANT_LIKE)).unwrap(), ClassId(0));

    let margin = svm.confidence(&RawReading::new(G220_HIGH)).unwrap().unwrap();
    assert!((margin - 5.062_586).abs() < 1e-3, "margin = {margin}");
    assert_eq!(svm.classify(&RawReading::new(G220_HIGH)).unwrap(), ClassId(1));
}

#[test]
fn test_tree_models_have_no_confidence() {
    for kind in [ModelKind::DecisionTree, ModelKind::RandomForest] {
        let dispatcher = Dispatcher::reference(kind).unwrap();
        assert_eq!(dispatcher.confidence(&RawReading::new(PLANT_LIKE)).unwrap(), None);
    }
}

#[test]
fn test_models_disagree_on_high_g220() {
    let raw = RawReading::new(G220_HIGH);
    let classes: Vec<_> = all_reference()
        .iter()
        .map(|d| d.classify(&raw).unwrap())
        .collect();
    assert_eq!(classes, vec![ClassId(0), ClassId(0), ClassId(1)]);
}

#[test]
fn test_dispatcher_from_artifact_json() {
    let json = r#"{
        "format": "enose-artifact",
        "version": 1,
        "classes": ["PLANTA", "AR_NEUTRO", "DOENTE"],
        "model": {
            "kind": "decision_tree",
            "nodes": [
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"leaf": 0},
                {"feature": 8, "threshold": 0.9, "left": 3, "right": 4},
                {"leaf": 1},
                {"leaf": 2}
            ]
        }
    }"#;

    let artifact = Artifact::from_json(json).unwrap();
    let dispatcher = Dispatcher::from_artifact(&artifact).unwrap();
    assert_eq!(dispatcher.model().n_classes(), 3);

    let raw = RawReading::new([8.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.5, 10.0]);
    assert_eq!(dispatcher.classify_named(&raw).unwrap(), (ClassId(2), "DOENTE"));
}

#[test]
fn test_exported_artifact_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let raw = RawReading::new(SCENARIO_A);

    for kind in ModelKind::ALL {
        let path = dir.path().join(format!("{}.json", kind.short()));
        let original = Dispatcher::reference(kind).unwrap();
        Artifact::from_model(original.model(), original.classes().clone())
            .save(&path)
            .unwrap();

        let reloaded = Dispatcher::from_artifact(&Artifact::load(&path).unwrap()).unwrap();
        assert_eq!(reloaded.classify(&raw), original.classify(&raw));
        assert_eq!(reloaded.confidence(&raw), original.confidence(&raw));
    }
}

#[test]
fn test_session_batch_and_evaluation() {
    let csv = "classe,G320,G295,G270,G245,G220,G195,G170,G145,G120,G100\n\
               PLANTA,1412,2163,3112,4541,7390,10867,17894,30882,64590,100000\n\
               AR_NEUTRO,3.2,2.9,3.0,2.8,4.0,6.5,10.7,18.5,0,6.0\n\
               AR_NEUTRO,3.2,2.9,3.0,2.8,4.0,6.5,10.7,18.5,0,0\n";
    let session = Session::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(session.len(), 3);

    let dispatcher = Dispatcher::reference(ModelKind::DecisionTree).unwrap();
    let report = dispatcher.classify_batch(session.readings());
    assert_eq!(report.counts, vec![1, 1]);
    assert_eq!(report.rejected(), 1);

    let labelled: Vec<_> = session
        .samples
        .iter()
        .map(|s| {
            let label = s.label.as_deref().unwrap();
            (dispatcher.classes().id_of(label).unwrap(), &s.reading)
        })
        .collect();
    let eval = evaluate(&dispatcher, labelled);
    assert_eq!(eval.accuracy(), Some(1.0));
    assert_eq!(eval.rejected, 1);
}

#[test]
fn test_shared_across_threads() {
    let dispatcher = Arc::new(Dispatcher::reference(ModelKind::RandomForest).unwrap());
    let raw = RawReading::new(SCENARIO_A);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || dispatcher.classify(&raw).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), ClassId(1));
    }
}

#[test]
fn test_reference_structure() {
    let tree = reference::decision_tree().unwrap();
    assert_eq!(tree.depth(), 5);

    let forest = reference::random_forest().unwrap();
    assert_eq!(forest.trees().len(), enose_ml::FOREST_SIZE);
    assert!(forest.trees().iter().all(|t| t.depth() <= 4));
}

//! Accuracy and confusion matrix of the active model on labelled readings

use enose_core::{ClassId, RawReading};
use serde::Serialize;

use crate::dispatch::Dispatcher;

/// Square matrix of counts, rows = true class, columns = predicted class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    n_classes: usize,
    data: Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            data: vec![0; n_classes * n_classes],
        }
    }

    /// Count one prediction against its true class
    ///
    /// # Panics
    ///
    /// If either id is not below `n_classes`.
    pub fn record(&mut self, actual: ClassId, predicted: ClassId) {
        self.data[actual.index() * self.n_classes + predicted.index()] += 1;
    }

    pub fn get(&self, actual: ClassId, predicted: ClassId) -> usize {
        self.data[actual.index() * self.n_classes + predicted.index()]
    }

    /// Counts for one true class, indexed by predicted class
    pub fn row(&self, actual: ClassId) -> &[usize] {
        let start = actual.index() * self.n_classes;
        &self.data[start..start + self.n_classes]
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn total(&self) -> usize {
        self.data.iter().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.n_classes)
            .map(|c| self.data[c * self.n_classes + c])
            .sum()
    }

    /// Fraction of correct predictions; `None` when nothing was recorded
    pub fn accuracy(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.correct() as f64 / total as f64),
        }
    }

    /// Correct predictions over all readings of `class`
    pub fn recall(&self, class: ClassId) -> Option<f64> {
        let row = self.row(class);
        let support: usize = row.iter().sum();
        (support > 0).then(|| row[class.index()] as f64 / support as f64)
    }
}

/// Result of [`evaluate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub matrix: ConfusionMatrix,
    /// Readings the engine refused (non-positive reference)
    pub rejected: usize,
}

impl Evaluation {
    pub fn accuracy(&self) -> Option<f64> {
        self.matrix.accuracy()
    }
}

/// Runs the dispatcher over `(true class, reading)` pairs.
///
/// Rejected readings are counted apart and never enter the matrix.
/// True classes must be valid ids of the dispatcher's class table.
pub fn evaluate<'a, I>(dispatcher: &Dispatcher, labelled: I) -> Evaluation
where
    I: IntoIterator<Item = (ClassId, &'a RawReading)>,
{
    let mut matrix = ConfusionMatrix::new(dispatcher.classes().len());
    let mut rejected = 0;

    for (actual, raw) in labelled {
        match dispatcher.classify(raw) {
            Ok(predicted) => matrix.record(actual, predicted),
            Err(err) => {
                tracing::warn!(class = %actual, error = %err, "labelled reading rejected");
                rejected += 1;
            }
        }
    }

    tracing::debug!(
        total = matrix.total(),
        correct = matrix.correct(),
        rejected,
        "evaluation finished"
    );
    Evaluation { matrix, rejected }
}

//! # Dispatcher
//!
//! Holds the single active model, chosen once at construction, and the
//! class-name table used for display. Every reading goes through the same
//! feature extraction before reaching the model.

use enose_core::{
    ClassId, ClassTable, Classifier, Component, EnoseError, EnoseResult, ModelKind, RawReading,
    extract,
};
use serde::Serialize;

use crate::artifact::Artifact;
use crate::model::Model;
use crate::reference;

/// Full result of one classification, for display and JSON output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub class: ClassId,
    pub name: String,
    pub model: ModelKind,
    /// SVM margin (linear model only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Per-class tally (forest only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<Vec<u32>>,
}

/// Active model plus class names
#[derive(Debug, Clone)]
pub struct Dispatcher {
    model: Model,
    classes: ClassTable,
}

impl Dispatcher {
    /// Fails with `MalformedModel` when the table names fewer classes than
    /// the model can predict.
    pub fn new(model: Model, classes: ClassTable) -> EnoseResult<Self> {
        if classes.len() < model.n_classes() {
            return Err(EnoseError::malformed(format!(
                "{} predicts {} classes but only {} names were given",
                model.kind().name(),
                model.n_classes(),
                classes.len()
            )));
        }

        tracing::debug!(
            model = %model.kind(),
            classes = classes.len(),
            "dispatcher ready"
        );
        Ok(Self { model, classes })
    }

    /// Bundled reference model of the given family with its default classes
    pub fn reference(kind: ModelKind) -> EnoseResult<Self> {
        Self::new(reference::model(kind)?, reference::class_table())
    }

    /// Validates an artifact and uses its own class table
    pub fn from_artifact(artifact: &Artifact) -> EnoseResult<Self> {
        Self::new(artifact.into_model()?, artifact.classes.clone())
    }

    /// Predicted class id.
    ///
    /// `InvalidReference` is returned unchanged and the model is not run.
    pub fn classify(&self, raw: &RawReading) -> EnoseResult<ClassId> {
        let class = self.model.classify_raw(raw)?;
        tracing::trace!(model = %self.model.kind(), class = %class, "classified");
        Ok(class)
    }

    /// Predicted class id and its display name
    pub fn classify_named(&self, raw: &RawReading) -> EnoseResult<(ClassId, &str)> {
        let class = self.classify(raw)?;
        Ok((class, self.name_of(class)?))
    }

    /// Class, name and the model-specific evidence behind it
    pub fn classify_detailed(&self, raw: &RawReading) -> EnoseResult<Classification> {
        let features = extract(raw)?;
        let class = self.model.predict(&features);

        Ok(Classification {
            class,
            name: self.name_of(class)?.to_string(),
            model: self.model.kind(),
            confidence: self.model.decision_value(&features),
            votes: self.model.votes(&features),
        })
    }

    /// SVM margin for the reading; `None` when the active model is a tree
    /// or a forest.
    pub fn confidence(&self, raw: &RawReading) -> EnoseResult<Option<f32>> {
        let features = extract(raw)?;
        Ok(self.model.decision_value(&features))
    }

    pub fn class_name(&self, class: ClassId) -> Option<&str> {
        self.classes.name(class)
    }

    /// Classifies every reading; rejected readings are kept as errors and
    /// never counted towards a class.
    pub fn classify_batch<'a, I>(&self, readings: I) -> BatchReport
    where
        I: IntoIterator<Item = &'a RawReading>,
    {
        let mut report = BatchReport {
            predictions: Vec::new(),
            counts: vec![0; self.classes.len()],
        };

        for (row, raw) in readings.into_iter().enumerate() {
            let result = self.classify(raw);
            match &result {
                Ok(class) => report.counts[class.index()] += 1,
                Err(err) => tracing::warn!(row, error = %err, "reading rejected"),
            }
            report.predictions.push(result);
        }

        tracing::debug!(
            accepted = report.accepted(),
            rejected = report.rejected(),
            "batch classified"
        );
        report
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    fn name_of(&self, class: ClassId) -> EnoseResult<&str> {
        self.classes
            .name(class)
            .ok_or_else(|| EnoseError::malformed(format!("class {class} has no name")))
    }
}

impl Component for Dispatcher {
    fn name(&self) -> &str {
        self.model.name()
    }
}

/// Outcome of [`Dispatcher::classify_batch`]
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// One entry per input reading, in input order
    pub predictions: Vec<EnoseResult<ClassId>>,
    /// Accepted readings per class id
    pub counts: Vec<usize>,
}

impl BatchReport {
    pub fn accepted(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn rejected(&self) -> usize {
        self.predictions.len() - self.accepted()
    }

    /// Class with the most accepted readings (lowest id on ties)
    pub fn dominant(&self) -> Option<ClassId> {
        if self.accepted() == 0 {
            return None;
        }
        let mut best = 0;
        for (class, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = class;
            }
        }
        Some(ClassId(best))
    }
}

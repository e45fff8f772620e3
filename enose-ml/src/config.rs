//! enose.toml configuration
//!
//! ```toml
//! [model]
//! kind = "random_forest"       # decision_tree | random_forest | linear_svm
//! artifact = "models/rf.json"  # optional; bundled reference model if absent
//!
//! [classes]
//! names = ["PLANTA", "AR_NEUTRO"]
//! ```
//!
//! Every section is optional.

use std::path::{Path, PathBuf};

use enose_core::{ClassTable, ModelKind};
use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::dispatch::Dispatcher;
use crate::error::{MlError, Result};
use crate::reference;

/// Default file name looked up in the working directory
pub const CONFIG_FILE: &str = "enose.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnoseConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub classes: ClassesConfig,
}

/// `[model]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Active model family
    #[serde(default)]
    pub kind: ModelKind,

    /// JSON artifact, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

/// `[classes]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassesConfig {
    /// Display names; when absent the artifact's (or the default) table is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

impl EnoseConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MlError::ConfigError(format!("Failed to parse {CONFIG_FILE}: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MlError::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Selects another model family.
    ///
    /// A configured artifact only describes the configured family, so it is
    /// dropped when the family changes.
    pub fn override_kind(&mut self, kind: ModelKind) {
        if kind != self.model.kind {
            if let Some(artifact) = self.model.artifact.take() {
                tracing::debug!(
                    artifact = %artifact.display(),
                    configured = %self.model.kind,
                    selected = %kind,
                    "ignoring configured artifact for a different model"
                );
            }
            self.model.kind = kind;
        }
    }

    /// Class table from `[classes] names`, if configured
    pub fn class_table(&self) -> Result<Option<ClassTable>> {
        self.classes
            .names
            .as_ref()
            .map(|names| ClassTable::new(names.iter().cloned()))
            .transpose()
            .map_err(|e| MlError::ConfigError(format!("[classes] names: {e}")))
    }

    /// Builds the active dispatcher.
    ///
    /// Artifact paths are resolved against `base_dir`. The artifact must hold
    /// a model of the configured kind.
    pub fn build_dispatcher(&self, base_dir: &Path) -> Result<Dispatcher> {
        let configured_names = self.class_table()?;

        let dispatcher = match &self.model.artifact {
            Some(path) => {
                let path = base_dir.join(path);
                let artifact = Artifact::load(&path)?;
                if artifact.kind() != self.model.kind {
                    return Err(MlError::ConfigError(format!(
                        "{} holds a {} model, but [model] kind is {}",
                        path.display(),
                        artifact.kind(),
                        self.model.kind
                    )));
                }
                let model = artifact.into_model()?;
                Dispatcher::new(model, configured_names.unwrap_or(artifact.classes))?
            }
            None => {
                let model = reference::model(self.model.kind)?;
                Dispatcher::new(model, configured_names.unwrap_or_else(reference::class_table))?
            }
        };

        tracing::info!(
            model = %dispatcher.kind(),
            classes = dispatcher.classes().len(),
            "active model selected"
        );
        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enose_core::{ClassId, EnoseError, RawReading};

    const SCENARIO_A: [f32; 10] = [3.2, 2.9, 3.0, 2.8, 4.0, 6.5, 10.7, 18.5, 0.0, 6.0];

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EnoseConfig::parse("").unwrap();
        assert_eq!(config, EnoseConfig::default());
        assert_eq!(config.model.kind, ModelKind::DecisionTree);
        assert_eq!(config.class_table().unwrap(), None);

        let dispatcher = config.build_dispatcher(Path::new(".")).unwrap();
        assert_eq!(dispatcher.kind(), ModelKind::DecisionTree);
        assert_eq!(dispatcher.classes(), &ClassTable::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = EnoseConfig::parse(
            r#"
            [model]
            kind = "linear_svm"

            [classes]
            names = ["PLANT", "AIR"]
            "#,
        )
        .unwrap();

        let dispatcher = config.build_dispatcher(Path::new(".")).unwrap();
        let raw = RawReading::new(SCENARIO_A);
        assert_eq!(dispatcher.classify_named(&raw).unwrap(), (ClassId(0), "PLANT"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = EnoseConfig::parse("[model]\nkind = \"knn\"\n").unwrap_err();
        assert!(matches!(err, MlError::ConfigError(_)));
    }

    #[test]
    fn test_bad_class_names() {
        let config = EnoseConfig::parse("[classes]\nnames = [\"A\", \"a\"]\n").unwrap();
        assert!(config.class_table().is_err());

        // one name cannot cover a two-class model
        let config = EnoseConfig::parse("[classes]\nnames = [\"ONLY\"]\n").unwrap();
        let err = config.build_dispatcher(Path::new(".")).unwrap_err();
        assert!(matches!(err.as_core(), Some(EnoseError::MalformedModel(_))));
    }

    #[test]
    fn test_artifact_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();

        let model = reference::model(ModelKind::RandomForest).unwrap();
        let classes = ClassTable::new(["P", "A"]).unwrap();
        Artifact::from_model(&model, classes)
            .save(&dir.path().join("models/rf.json"))
            .unwrap();

        let config_path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &config_path,
            "[model]\nkind = \"random_forest\"\nartifact = \"models/rf.json\"\n",
        )
        .unwrap();

        let config = EnoseConfig::load(&config_path).unwrap();
        let dispatcher = config.build_dispatcher(dir.path()).unwrap();
        assert_eq!(dispatcher.kind(), ModelKind::RandomForest);
        // artifact's own class names
        assert_eq!(dispatcher.class_name(ClassId(1)), Some("A"));
    }

    #[test]
    fn test_artifact_kind_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let model = reference::model(ModelKind::LinearSvm).unwrap();
        Artifact::from_model(&model, reference::class_table())
            .save(&dir.path().join("svm.json"))
            .unwrap();

        let config =
            EnoseConfig::parse("[model]\nkind = \"decision_tree\"\nartifact = \"svm.json\"\n").unwrap();
        let err = config.build_dispatcher(dir.path()).unwrap_err();
        assert!(err.to_string().contains("linear_svm"));
    }

    #[test]
    fn test_override_kind_drops_artifact() {
        let mut config =
            EnoseConfig::parse("[model]\nkind = \"random_forest\"\nartifact = \"rf.json\"\n").unwrap();

        config.override_kind(ModelKind::RandomForest);
        assert!(config.model.artifact.is_some());

        config.override_kind(ModelKind::LinearSvm);
        assert_eq!(config.model.kind, ModelKind::LinearSvm);
        assert_eq!(config.model.artifact, None);
    }

    #[test]
    fn test_to_toml() {
        let mut config = EnoseConfig::default();
        config.model.kind = ModelKind::RandomForest;
        config.classes.names = Some(vec!["PLANTA".into(), "AR_NEUTRO".into()]);

        let text = config.to_toml().unwrap();
        assert!(text.contains("kind = \"random_forest\""));
        assert_eq!(EnoseConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = EnoseConfig::load(Path::new("/nonexistent/enose.toml")).unwrap_err();
        assert!(matches!(err, MlError::ConfigError(_)));
    }
}

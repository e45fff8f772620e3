//! Tipos de dados do nariz eletrônico

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EnoseError, EnoseResult};

/// Canais brutos por leitura (perfil de aquecedor do BME688)
pub const NUM_CHANNELS: usize = 10;

/// Features derivadas: um canal a menos (a referência vira denominador)
pub const NUM_FEATURES: usize = NUM_CHANNELS - 1;

/// Índice do canal de referência (G100)
pub const REFERENCE_CHANNEL: usize = NUM_CHANNELS - 1;

/// Nomes dos canais na ordem do driver do sensor
pub const CHANNEL_NAMES: [&str; NUM_CHANNELS] = [
    "G320", "G295", "G270", "G245", "G220", "G195", "G170", "G145", "G120", "G100",
];

/// Nomes das features (razão de cada canal contra G100)
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "R_G320", "R_G295", "R_G270", "R_G245", "R_G220", "R_G195", "R_G170", "R_G145", "R_G120",
];

/// Classes dos modelos de referência
pub const DEFAULT_CLASS_NAMES: [&str; 2] = ["PLANTA", "AR_NEUTRO"];

// ═══════════════════════════════════════════════════════════════════════════════
// LEITURA BRUTA
// ═══════════════════════════════════════════════════════════════════════════════

/// Leitura bruta: 10 resistências de gás, a última é a referência (G100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReading {
    channels: [f32; NUM_CHANNELS],
}

impl RawReading {
    pub const fn new(channels: [f32; NUM_CHANNELS]) -> Self {
        Self { channels }
    }

    /// Todos os canais, na ordem G320 … G100
    pub fn channels(&self) -> &[f32; NUM_CHANNELS] {
        &self.channels
    }

    /// Valor do canal de referência (G100)
    pub fn reference(&self) -> f32 {
        self.channels[REFERENCE_CHANNEL]
    }

    /// Busca canal pelo nome (`"G270"`, ...)
    pub fn channel(&self, name: &str) -> Option<f32> {
        CHANNEL_NAMES
            .iter()
            .position(|&n| n.eq_ignore_ascii_case(name))
            .map(|i| self.channels[i])
    }
}

impl From<[f32; NUM_CHANNELS]> for RawReading {
    fn from(channels: [f32; NUM_CHANNELS]) -> Self {
        Self::new(channels)
    }
}

impl TryFrom<&[f32]> for RawReading {
    type Error = EnoseError;

    fn try_from(values: &[f32]) -> EnoseResult<Self> {
        let channels: [f32; NUM_CHANNELS] =
            values.try_into().map_err(|_| EnoseError::ShapeMismatch {
                expected: NUM_CHANNELS,
                actual: values.len(),
            })?;
        Ok(Self::new(channels))
    }
}

impl Index<usize> for RawReading {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.channels[index]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VETOR DE FEATURES
// ═══════════════════════════════════════════════════════════════════════════════

/// Vetor de 9 razões `canal[i] / G100`, consumido por todos os classificadores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: [f32; NUM_FEATURES],
}

impl FeatureVector {
    pub const fn new(values: [f32; NUM_FEATURES]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f32; NUM_FEATURES] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// Cópia com uma feature alterada
    ///
    /// # Panics
    ///
    /// Se `index >= NUM_FEATURES`.
    pub fn with_feature(mut self, index: usize, value: f32) -> Self {
        self.values[index] = value;
        self
    }
}

impl From<[f32; NUM_FEATURES]> for FeatureVector {
    fn from(values: [f32; NUM_FEATURES]) -> Self {
        Self::new(values)
    }
}

impl TryFrom<&[f32]> for FeatureVector {
    type Error = EnoseError;

    fn try_from(values: &[f32]) -> EnoseResult<Self> {
        let values: [f32; NUM_FEATURES] =
            values.try_into().map_err(|_| EnoseError::ShapeMismatch {
                expected: NUM_FEATURES,
                actual: values.len(),
            })?;
        Ok(Self::new(values))
    }
}

impl Index<usize> for FeatureVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.values[index]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSES
// ═══════════════════════════════════════════════════════════════════════════════

/// Identificador de classe (índice na tabela de nomes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub usize);

impl ClassId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ClassId {
    fn from(id: usize) -> Self {
        ClassId(id)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tabela ordenada de nomes de classe, só para exibição
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassTable {
    names: Vec<String>,
}

impl ClassTable {
    /// Cria tabela; exige ao menos uma classe e nomes únicos
    pub fn new<I, S>(names: I) -> EnoseResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(EnoseError::malformed("class table must have at least one class"));
        }

        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(EnoseError::malformed(format!("class {i} has an empty name")));
            }
            if names[..i].iter().any(|prev| prev.eq_ignore_ascii_case(name)) {
                return Err(EnoseError::malformed(format!("duplicate class name: {name}")));
            }
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, class: ClassId) -> Option<&str> {
        self.names.get(class.index()).map(String::as_str)
    }

    /// Busca id pelo nome (sem diferenciar maiúsculas)
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(ClassId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (ClassId(i), n.as_str()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for ClassTable {
    type Error = EnoseError;

    fn try_from(names: Vec<String>) -> EnoseResult<Self> {
        Self::new(names)
    }
}

impl From<ClassTable> for Vec<String> {
    fn from(table: ClassTable) -> Self {
        table.names
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIPO DE MODELO
// ═══════════════════════════════════════════════════════════════════════════════

/// Os três modelos intercambiáveis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Árvore de decisão única
    #[default]
    DecisionTree,
    /// Floresta aleatória (votação majoritária)
    RandomForest,
    /// SVM linear com StandardScaler
    LinearSvm,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::LinearSvm,
    ];

    /// Nome legível
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::LinearSvm => "SVM Linear",
        }
    }

    /// Identificador estável (usado em config e artefatos)
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::LinearSvm => "linear_svm",
        }
    }

    /// Abreviação usada pelo script de treino (`dt`, `rf`, `svm`)
    pub fn short(&self) -> &'static str {
        match self {
            ModelKind::DecisionTree => "dt",
            ModelKind::RandomForest => "rf",
            ModelKind::LinearSvm => "svm",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dt" | "tree" | "decision_tree" => Ok(ModelKind::DecisionTree),
            "rf" | "forest" | "random_forest" => Ok(ModelKind::RandomForest),
            "svm" | "linear_svm" | "svm_linear" => Ok(ModelKind::LinearSvm),
            other => Err(format!(
                "unknown model kind '{other}' (expected dt, rf or svm)"
            )),
        }
    }
}

//! Erros do núcleo de inferência

use thiserror::Error;

pub type EnoseResult<T> = Result<T, EnoseError>;

/// Erros do nariz eletrônico
///
/// `InvalidReference` e `ShapeMismatch` acontecem por chamada e o chamador
/// pode se recuperar com uma nova amostra. `DegenerateScaler` e
/// `MalformedModel` invalidam o artefato inteiro e só aparecem na carga.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnoseError {
    /// Canal de referência (G100) não positivo
    #[error("Invalid reference channel: G100 = {value} (must be > 0)")]
    InvalidReference { value: f32 },

    /// Desvio padrão nulo, negativo ou não finito no scaler do SVM
    #[error("Degenerate scaler: feature {feature} has std = {std}")]
    DegenerateScaler { feature: usize, std: f32 },

    /// Estrutura de modelo inválida (galho faltando, tamanho errado, ...)
    #[error("Malformed model: {0}")]
    MalformedModel(String),

    /// Quantidade de valores diferente da esperada
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl EnoseError {
    /// Atalho para `MalformedModel`
    pub fn malformed(msg: impl Into<String>) -> Self {
        EnoseError::MalformedModel(msg.into())
    }

    /// Erro de uma única chamada (nova leitura resolve)?
    pub fn is_per_call(&self) -> bool {
        matches!(
            self,
            EnoseError::InvalidReference { .. } | EnoseError::ShapeMismatch { .. }
        )
    }

    /// Erro de validade do artefato (fatal para aquele modelo)?
    pub fn is_artifact_error(&self) -> bool {
        matches!(
            self,
            EnoseError::DegenerateScaler { .. } | EnoseError::MalformedModel(_)
        )
    }
}

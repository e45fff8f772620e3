//! # Traits - contratos dos componentes de inferência
//!
//! > *"Trait no core, implementação no módulo."*
//!
//! Os classificadores concretos (árvore, floresta, SVM) vivem em `enose-ml`;
//! aqui ficam só as abstrações que o despachante e os testes usam.

use std::fmt::Debug;

use crate::error::EnoseResult;
use crate::features::extract;
use crate::types::{ClassId, FeatureVector, ModelKind, RawReading};

/// Trait base de todo componente do nariz eletrônico
pub trait Component: Send + Sync + Debug {
    /// Nome único do componente (para logs e debug)
    fn name(&self) -> &str;

    /// Versão do componente
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Componente está pronto para uso?
    fn is_ready(&self) -> bool {
        true
    }
}

/// Classificador sobre o vetor de 9 razões.
///
/// `predict` é total: todo vetor de features produz um [`ClassId`] válido
/// (`< n_classes()`). Modelos são imutáveis após a construção, então uma
/// mesma instância pode ser compartilhada entre threads sem lock.
pub trait Classifier: Component {
    /// Classe prevista para o vetor de features
    fn predict(&self, features: &FeatureVector) -> ClassId;

    /// Quantidade de classes que o modelo pode devolver
    fn n_classes(&self) -> usize;

    /// Família do modelo
    fn kind(&self) -> ModelKind;

    /// Extrai features e classifica.
    ///
    /// Referência inválida interrompe antes de `predict` ser chamado.
    fn classify_raw(&self, raw: &RawReading) -> EnoseResult<ClassId> {
        let features = extract(raw)?;
        Ok(self.predict(&features))
    }

    /// Classifica vários vetores em sequência
    fn predict_batch(&self, batch: &[FeatureVector]) -> Vec<ClassId> {
        batch.iter().map(|f| self.predict(f)).collect()
    }
}

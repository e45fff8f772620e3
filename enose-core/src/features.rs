//! Extração de features: razões normalizadas pelo canal de referência (G100)
//!
//! `feature[i] = raw[i] / raw[9]` para i em 0..9. A referência precisa ser
//! positiva; qualquer outro valor dos canais passa adiante sem validação.

use crate::error::{EnoseError, EnoseResult};
use crate::types::{FeatureVector, NUM_FEATURES, RawReading};

/// Converte leitura bruta em vetor de razões
pub fn extract(raw: &RawReading) -> EnoseResult<FeatureVector> {
    let reference = raw.reference();

    // NaN também é rejeitado
    if reference.is_nan() || reference <= 0.0 {
        return Err(EnoseError::InvalidReference { value: reference });
    }

    let mut ratios = [0.0f32; NUM_FEATURES];
    for (ratio, &value) in ratios.iter_mut().zip(raw.channels().iter()) {
        *ratio = value / reference;
    }

    Ok(FeatureVector::new(ratios))
}

impl RawReading {
    /// Atalho para [`extract`]
    pub fn features(&self) -> EnoseResult<FeatureVector> {
        extract(self)
    }
}

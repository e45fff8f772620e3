//! # enose-core - Núcleo do Nariz Eletrônico
//!
//! Tipos e contratos compartilhados pela inferência:
//!
//! - [`RawReading`]: 10 resistências de gás do BME688 (G320 … G100)
//! - [`FeatureVector`]: 9 razões `canal / G100`
//! - [`ClassId`] e [`ClassTable`]: classe prevista e seu nome de exibição
//! - [`Classifier`]: contrato comum da árvore, da floresta e do SVM
//!
//! ## Fluxo
//!
//! ```text
//! leitura bruta → extract() → FeatureVector → Classifier::predict → ClassId
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use enose_core::prelude::*;
//!
//! let raw = RawReading::new([3.2, 2.9, 3.0, 2.8, 4.0, 6.5, 10.7, 18.5, 0.0, 6.0]);
//! let features = extract(&raw)?;
//! assert_eq!(features[8], 0.0);
//! # Ok::<(), EnoseError>(())
//! ```

pub mod error;
pub mod features;
pub mod prelude;
pub mod traits;
pub mod types;

pub use error::{EnoseError, EnoseResult};
pub use features::extract;
pub use traits::{Classifier, Component};
pub use types::{
    CHANNEL_NAMES, ClassId, ClassTable, DEFAULT_CLASS_NAMES, FEATURE_NAMES, FeatureVector,
    ModelKind, NUM_CHANNELS, NUM_FEATURES, REFERENCE_CHANNEL, RawReading,
};

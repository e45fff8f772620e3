//! # Prelude - Re-exportações Convenientes
//!
//! ```
//! use enose_core::prelude::*;
//! ```

pub use crate::error::{EnoseError, EnoseResult};
pub use crate::features::extract;
pub use crate::traits::{Classifier, Component};
pub use crate::types::{
    CHANNEL_NAMES, ClassId, ClassTable, DEFAULT_CLASS_NAMES, FEATURE_NAMES, FeatureVector,
    ModelKind, NUM_CHANNELS, NUM_FEATURES, REFERENCE_CHANNEL, RawReading,
};

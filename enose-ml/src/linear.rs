//! # Linear SVM
//!
//! `score = bias + Σ weight[i] · (feature[i] − mean[i]) / std[i]`
//!
//! Class 1 when `score > 0`, class 0 otherwise. The raw score is the signed
//! distance-like margin exposed by [`LinearSvm::decision_value`].

use enose_core::{
    ClassId, Classifier, Component, EnoseError, EnoseResult, FeatureVector, ModelKind,
    NUM_FEATURES,
};

/// The SVM separates exactly two classes
pub const SVM_CLASSES: usize = 2;

/// Per-feature standardization with precomputed statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: [f32; NUM_FEATURES],
    std: [f32; NUM_FEATURES],
}

impl StandardScaler {
    /// Rejects non-positive or non-finite deviations with `DegenerateScaler`
    pub fn new(mean: [f32; NUM_FEATURES], std: [f32; NUM_FEATURES]) -> EnoseResult<Self> {
        for (feature, (&m, &s)) in mean.iter().zip(std.iter()).enumerate() {
            if !m.is_finite() {
                return Err(EnoseError::malformed(format!(
                    "scaler mean for feature {feature} is not finite"
                )));
            }
            if !s.is_finite() || s <= 0.0 {
                return Err(EnoseError::DegenerateScaler { feature, std: s });
            }
        }
        Ok(Self { mean, std })
    }

    /// Standardized value of one feature
    #[inline]
    pub fn scale(&self, feature: usize, value: f32) -> f32 {
        (value - self.mean[feature]) / self.std[feature]
    }

    pub fn transform(&self, features: &FeatureVector) -> [f32; NUM_FEATURES] {
        let mut out = [0.0f32; NUM_FEATURES];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.scale(i, features[i]);
        }
        out
    }

    pub fn mean(&self) -> &[f32; NUM_FEATURES] {
        &self.mean
    }

    pub fn std(&self) -> &[f32; NUM_FEATURES] {
        &self.std
    }
}

/// Linear support-vector classifier on standardized features
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSvm {
    weights: [f32; NUM_FEATURES],
    bias: f32,
    scaler: StandardScaler,
}

impl LinearSvm {
    pub fn new(weights: [f32; NUM_FEATURES], bias: f32, scaler: StandardScaler) -> EnoseResult<Self> {
        if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
            return Err(EnoseError::malformed(format!("SVM weight {i} is not finite")));
        }
        if !bias.is_finite() {
            return Err(EnoseError::malformed("SVM bias is not finite"));
        }
        Ok(Self {
            weights,
            bias,
            scaler,
        })
    }

    /// Signed decision score (confidence / margin)
    pub fn decision_value(&self, features: &FeatureVector) -> f32 {
        let mut score = self.bias;
        for (i, &w) in self.weights.iter().enumerate() {
            score += w * self.scaler.scale(i, features[i]);
        }
        score
    }

    pub fn predict(&self, features: &FeatureVector) -> ClassId {
        if self.decision_value(features) > 0.0 {
            ClassId(1)
        } else {
            ClassId(0)
        }
    }

    pub fn weights(&self) -> &[f32; NUM_FEATURES] {
        &self.weights
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

impl Component for LinearSvm {
    fn name(&self) -> &str {
        "LinearSvm"
    }
}

impl Classifier for LinearSvm {
    fn predict(&self, features: &FeatureVector) -> ClassId {
        LinearSvm::predict(self, features)
    }

    fn n_classes(&self) -> usize {
        SVM_CLASSES
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LinearSvm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WEIGHTS: [f32; 9] = [2.0, -1.0, 0.5, 0.0, 1.0, -3.0, 0.25, 1.5, -0.5];

    fn svm(bias: f32) -> LinearSvm {
        let scaler = StandardScaler::new([0.5; 9], [0.25; 9]).unwrap();
        LinearSvm::new(WEIGHTS, bias, scaler).unwrap()
    }

    #[test]
    fn test_score_at_mean_is_bias() {
        let model = svm(-0.75);
        let at_mean = FeatureVector::new([0.5; 9]);
        assert_eq!(model.decision_value(&at_mean), -0.75);
        assert_eq!(model.predict(&at_mean), ClassId(0));

        let model = svm(0.75);
        assert_eq!(model.predict(&at_mean), ClassId(1));
    }

    #[test]
    fn test_zero_score_is_class_zero() {
        let model = svm(0.0);
        let at_mean = FeatureVector::new([0.5; 9]);
        assert_eq!(model.decision_value(&at_mean), 0.0);
        assert_eq!(model.predict(&at_mean), ClassId(0));
    }

    #[test]
    fn test_single_feature_contribution() {
        let model = svm(0.0);
        // one std above the mean on feature 0 adds weight[0]
        let x = FeatureVector::new([0.5; 9]).with_feature(0, 0.75);
        assert_eq!(model.decision_value(&x), 2.0);
        assert_eq!(model.scaler().transform(&x)[0], 1.0);
    }

    #[test]
    fn test_degenerate_scaler() {
        let mut std = [0.25; 9];
        std[6] = 0.0;
        let err = StandardScaler::new([0.5; 9], std).unwrap_err();
        assert_eq!(err, EnoseError::DegenerateScaler { feature: 6, std: 0.0 });

        std[6] = -0.1;
        assert!(matches!(
            StandardScaler::new([0.5; 9], std),
            Err(EnoseError::DegenerateScaler { feature: 6, .. })
        ));

        std[6] = f32::NAN;
        assert!(StandardScaler::new([0.5; 9], std).is_err());
    }

    #[test]
    fn test_rejects_non_finite_parameters() {
        let scaler = StandardScaler::new([0.5; 9], [0.25; 9]).unwrap();
        let mut weights = WEIGHTS;
        weights[2] = f32::INFINITY;
        assert!(LinearSvm::new(weights, 0.0, scaler).is_err());
        assert!(LinearSvm::new(WEIGHTS, f32::NAN, scaler).is_err());

        let mut mean = [0.5; 9];
        mean[1] = f32::NAN;
        assert!(StandardScaler::new(mean, [0.25; 9]).is_err());
    }

    proptest! {
        #[test]
        fn prop_class_one_iff_positive_score(
            values in prop::array::uniform9(-2.0f32..2.0),
            bias in -3.0f32..3.0,
        ) {
            let model = svm(bias);
            let x = FeatureVector::new(values);
            let positive = model.decision_value(&x) > 0.0;
            prop_assert_eq!(model.predict(&x) == ClassId(1), positive);
        }

        #[test]
        fn prop_score_follows_weight_sign(
            values in prop::array::uniform9(-2.0f32..2.0),
            feature in 0usize..9,
            delta in 0.01f32..1.0,
        ) {
            let model = svm(0.0);
            let x = FeatureVector::new(values);
            let y = x.with_feature(feature, values[feature] + delta);
            let (before, after) = (model.decision_value(&x), model.decision_value(&y));

            let w = WEIGHTS[feature];
            if w > 0.0 {
                prop_assert!(after > before);
            } else if w < 0.0 {
                prop_assert!(after < before);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }
}

//! Base/diff decision from image features.

use crate::features::ImageFeatures;

/// Thresholds and weights for the diff decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// An image is a diff only if its valid ratio is below this value.
    pub valid_ratio_max: f64,
    /// An image is a diff only if its largest fill component exceeds this ratio.
    pub fill_cc_ratio_min: f64,
    /// Weight of the fill component ratio in `diff_score`; the remainder
    /// weighs the invalid (black/white) fraction.
    pub fill_cc_weight: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            valid_ratio_max: 0.55,
            fill_cc_ratio_min: 0.35,
            fill_cc_weight: 0.55,
        }
    }
}

/// Outcome of classifying one image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub is_diff: bool,
    /// Diff tendency; `diff_score + full_score == 1`.
    pub diff_score: f64,
    pub full_score: f64,
}

/// Fixed-threshold classifier separating diff overlays from full images.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffClassifier {
    cfg: ClassifierConfig,
}

impl DiffClassifier {
    /// Creates a classifier with explicit thresholds.
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    /// Classifies from the two ratios that drive the decision.
    pub fn decide(&self, valid_ratio: f64, max_fill_cc_ratio: f64) -> Classification {
        let w = self.cfg.fill_cc_weight;
        let diff_score = w * max_fill_cc_ratio + (1.0 - w) * (1.0 - valid_ratio);
        let is_diff = valid_ratio < self.cfg.valid_ratio_max
            && max_fill_cc_ratio > self.cfg.fill_cc_ratio_min;
        Classification {
            is_diff,
            diff_score,
            full_score: 1.0 - diff_score,
        }
    }

    /// Classifies an image from its extracted features.
    pub fn classify(&self, features: &ImageFeatures) -> Classification {
        self.decide(features.valid_ratio, features.max_fill_cc_ratio)
    }
}

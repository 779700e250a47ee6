//! Decision policy: arg-max plus an inclusive confidence threshold

use serde::Serialize;

use crate::labels::{Label, LabelSet};
use crate::predictor::ProbabilityVector;
use crate::{ClassifierError, Result};

/// Outcome of classifying one image
///
/// Created once per upload and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    label: Label,
    confidence: f32,
    accepted: bool,
}

impl ClassificationResult {
    /// Label for accepted results only; rejected results expose none
    pub fn accepted_label(&self) -> Option<&Label> {
        self.accepted.then_some(&self.label)
    }

    /// Arg-max label regardless of outcome (diagnostics only)
    pub fn top_label(&self) -> &Label {
        &self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Confidence as a percentage with two decimals, e.g. `84.00%`
    pub fn confidence_percent(&self) -> String {
        format_confidence(self.confidence)
    }
}

/// Format a `[0, 1]` confidence as `NN.NN%`
pub fn format_confidence(confidence: f32) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Stateless accept/reject rule
#[derive(Debug, Clone, Copy)]
pub struct DecisionPolicy {
    threshold: f32,
}

impl DecisionPolicy {
    pub fn new(threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ClassifierError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Pick the arg-max label and accept iff its score ≥ threshold
    pub fn decide(&self, labels: &LabelSet, scores: &ProbabilityVector) -> Result<ClassificationResult> {
        if scores.len() != labels.len() {
            return Err(ClassifierError::OutputShape {
                expected: labels.len(),
                actual: scores.len(),
            });
        }

        let (index, confidence) = scores
            .argmax()
            .ok_or_else(|| ClassifierError::Inference("model scores are all NaN".to_string()))?;
        let label = labels
            .get(index)
            .cloned()
            .ok_or(ClassifierError::OutputShape {
                expected: labels.len(),
                actual: scores.len(),
            })?;

        Ok(ClassificationResult {
            label,
            confidence,
            accepted: confidence >= self.threshold,
        })
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: breedid_common::config::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

//! Classification pipeline: normalize → predict → decide → describe

use std::sync::Arc;

use image::RgbImage;
use serde::Serialize;
use tracing::info;

use crate::knowledge::{BreedInfo, BreedKnowledgeBase};
use crate::labels::{Label, LabelSet};
use crate::normalizer::ImageNormalizer;
use crate::policy::{ClassificationResult, DecisionPolicy};
use crate::predictor::{BreedPredictor, ProbabilityVector};
use crate::Result;

/// One label with its raw model score
#[derive(Debug, Clone, Serialize)]
pub struct LabelScore {
    pub label: Label,
    pub score: f32,
}

/// Everything downstream consumers need about one classified image
#[derive(Debug, Clone)]
pub struct Classification {
    pub result: ClassificationResult,
    pub scores: Vec<LabelScore>,
    /// Present only when the result was accepted
    pub info: Option<BreedInfo>,
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        self.result.is_accepted()
    }
}

/// Owns the pipeline stages; shared read-only across requests
pub struct BreedClassifier {
    labels: LabelSet,
    normalizer: ImageNormalizer,
    predictor: Arc<dyn BreedPredictor>,
    policy: DecisionPolicy,
    knowledge: BreedKnowledgeBase,
}

impl BreedClassifier {
    pub fn new(
        labels: LabelSet,
        normalizer: ImageNormalizer,
        predictor: Arc<dyn BreedPredictor>,
        policy: DecisionPolicy,
        knowledge: BreedKnowledgeBase,
    ) -> Self {
        Self {
            labels,
            normalizer,
            predictor,
            policy,
            knowledge,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn predictor_description(&self) -> String {
        self.predictor.describe()
    }

    /// Decode upload bytes into RGB (kept by callers for gallery storage)
    pub fn decode(&self, bytes: &[u8]) -> Result<RgbImage> {
        self.normalizer.decode(bytes)
    }

    /// Run the full pipeline on a decoded image
    pub fn classify(&self, image: &RgbImage) -> Result<Classification> {
        let tensor = self.normalizer.normalize(image);
        let scores = self.predictor.predict(&tensor)?;
        self.classify_scores(scores)
    }

    /// Apply the decision policy and knowledge lookup to raw model scores
    pub fn classify_scores(&self, scores: ProbabilityVector) -> Result<Classification> {
        let result = self.policy.decide(&self.labels, &scores)?;

        let info = result
            .accepted_label()
            .map(|label| self.knowledge.lookup(label).clone());

        if result.is_accepted() {
            info!(
                label = %result.top_label(),
                confidence = %result.confidence_percent(),
                "Prediction accepted"
            );
        } else {
            info!(
                top = %result.top_label(),
                confidence = %result.confidence_percent(),
                threshold = self.policy.threshold(),
                "Prediction rejected (below threshold)"
            );
        }

        let scores = self
            .labels
            .iter()
            .zip(scores.as_slice())
            .map(|(label, &score)| LabelScore {
                label: label.clone(),
                score,
            })
            .collect();

        Ok(Classification {
            result,
            scores,
            info,
        })
    }
}

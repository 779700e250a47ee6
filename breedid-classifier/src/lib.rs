//! breedid-classifier - dog breed classification core
//!
//! Pipeline: decode upload → [`ImageNormalizer`] → [`BreedPredictor`] →
//! [`DecisionPolicy`] → [`BreedKnowledgeBase`] lookup on accept.
//!
//! The predictor is loaded once by the caller and shared read-only; nothing
//! in this crate holds global state.

pub mod error;
pub mod knowledge;
pub mod labels;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod predictor;

pub use crate::error::{ClassifierError, Result};
pub use crate::knowledge::{BreedInfo, BreedKnowledgeBase};
pub use crate::labels::{Label, LabelSet};
pub use crate::normalizer::{ImageNormalizer, InputTensor};
pub use crate::pipeline::{BreedClassifier, Classification, LabelScore};
pub use crate::policy::{ClassificationResult, DecisionPolicy};
pub use crate::predictor::{BreedPredictor, OnnxBreedPredictor, ProbabilityVector};

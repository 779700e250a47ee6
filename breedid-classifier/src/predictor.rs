//! Breed predictor
//!
//! [`BreedPredictor`] is the seam between the pipeline and the model runtime.
//! [`OnnxBreedPredictor`] loads a pretrained ONNX graph once and runs it
//! read-only for every request.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::normalizer::InputTensor;
use crate::{ClassifierError, Result};

/// Model scores, positionally aligned with the label set
///
/// Values are treated as relative confidences; they need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Index and value of the maximum score
    ///
    /// The first index wins on exact ties. NaN never wins; an all-NaN or
    /// empty vector has no maximum.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &v) in self.0.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((i, v)),
            }
        }
        best
    }
}

impl From<Vec<f32>> for ProbabilityVector {
    fn from(scores: Vec<f32>) -> Self {
        Self::new(scores)
    }
}

/// A pretrained classifier: normalized tensor in, score vector out
///
/// Implementations must be pure with respect to their input and safe to
/// share across threads.
pub trait BreedPredictor: Send + Sync {
    fn predict(&self, input: &InputTensor) -> Result<ProbabilityVector>;

    /// Short description for logs and the health endpoint
    fn describe(&self) -> String {
        "breed predictor".to_string()
    }
}

/// ONNX model executed with tract
pub struct OnnxBreedPredictor {
    model: TypedRunnableModel<TypedModel>,
    path: PathBuf,
    input_shape: [usize; 4],
}

impl OnnxBreedPredictor {
    /// Load and optimize the model for a fixed `(1, height, width, 3)` input
    ///
    /// Call once before serving; failure here is fatal for the process.
    pub fn load(path: &Path, width: u32, height: u32) -> Result<Self> {
        if !path.is_file() {
            return Err(ClassifierError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let (h, w) = (height as usize, width as usize);
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| {
                m.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, h, w, 3)))
            })
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {:#}", path.display(), e)))?;

        info!("Loaded ONNX model {} (input 1x{}x{}x3)", path.display(), h, w);

        Ok(Self {
            model,
            path: path.to_path_buf(),
            input_shape: [1, h, w, 3],
        })
    }
}

impl BreedPredictor for OnnxBreedPredictor {
    fn predict(&self, input: &InputTensor) -> Result<ProbabilityVector> {
        if input.shape() != self.input_shape {
            return Err(ClassifierError::Inference(format!(
                "input shape {:?} does not match model input {:?}",
                input.shape(),
                self.input_shape
            )));
        }

        let tensor: Tensor = input.as_array().clone().into();
        let outputs = self
            .model
            .run(tvec!(tensor.into()))
            .map_err(|e| ClassifierError::Inference(format!("{:#}", e)))?;

        let first = outputs
            .first()
            .ok_or_else(|| ClassifierError::Inference("model produced no outputs".to_string()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("output is not f32: {:#}", e)))?;

        let scores: Vec<f32> = view.iter().copied().collect();
        debug!(?scores, "Model output");
        Ok(ProbabilityVector::new(scores))
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_argmax_strict_maximum() {
        let v = ProbabilityVector::new(vec![0.05, 0.03, 0.84, 0.05, 0.03]);
        assert_eq!(v.argmax(), Some((2, 0.84)));
    }

    #[test]
    fn test_argmax_first_index_wins_ties() {
        let v = ProbabilityVector::new(vec![0.1, 0.45, 0.45]);
        assert_eq!(v.argmax(), Some((1, 0.45)));
    }

    #[test]
    fn test_argmax_skips_nan() {
        let v = ProbabilityVector::new(vec![f32::NAN, 0.2, 0.1]);
        assert_eq!(v.argmax(), Some((1, 0.2)));

        let all_nan = ProbabilityVector::new(vec![f32::NAN, f32::NAN]);
        assert_eq!(all_nan.argmax(), None);
        assert_eq!(ProbabilityVector::new(vec![]).argmax(), None);
    }

    #[test]
    fn test_load_missing_model_fails() {
        let result = OnnxBreedPredictor::load(Path::new("/nonexistent/model.onnx"), 224, 224);
        assert!(matches!(result, Err(ClassifierError::ModelLoad(_))));
    }

    #[test]
    fn test_load_corrupt_model_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a protobuf graph").unwrap();

        let result = OnnxBreedPredictor::load(file.path(), 224, 224);
        assert!(matches!(result, Err(ClassifierError::ModelLoad(_))));
    }
}

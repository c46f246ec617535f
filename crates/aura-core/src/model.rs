//! Model-backed attribute classification via ONNX Runtime.
//!
//! Each attribute model is an image classifier taking a 224x224 RGB crop and
//! emitting one score per label of the kind's vocabulary, in vocabulary order.

use crate::error::AnalysisError;
use crate::frame::ImageFrame;
use crate::types::{AttributeKind, AttributeResult};
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

// --- Named constants ---
const CLASSIFIER_INPUT_SIZE: u32 = 224;
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];
const PROBABILITY_SUM_TOLERANCE: f32 = 1e-3;

/// A loaded attribute model. Opaque to the analyzer beyond this call.
///
/// `infer` takes `&mut self`: runtimes such as ONNX Runtime need exclusive
/// access to run a session, so the analyzer serializes calls per kind.
pub trait AttributeModel: Send {
    /// Raw scores, one per label in `kind.vocabulary()`.
    fn infer(&mut self, image: &ImageFrame) -> Result<Vec<f32>, AnalysisError>;
}

/// Resolves a kind's artifact into a loaded model.
pub trait ModelLoader: Send + Sync {
    fn load(&self, kind: AttributeKind, path: &Path) -> Result<Box<dyn AttributeModel>, AnalysisError>;
}

/// Turn raw model scores into a model-backed result.
///
/// Scores that already form a probability distribution are used as-is;
/// anything else is treated as logits and passed through softmax.
pub fn classify(kind: AttributeKind, scores: &[f32]) -> Result<AttributeResult, AnalysisError> {
    let vocab = kind.vocabulary();
    if scores.len() != vocab.len() {
        return Err(AnalysisError::inference(
            kind,
            format!("expected {} scores, got {}", vocab.len(), scores.len()),
        ));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(AnalysisError::inference(kind, "non-finite score in model output"));
    }

    let probs = if is_distribution(scores) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    let (best, p) = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| AnalysisError::inference(kind, "empty model output"))?;

    Ok(AttributeResult::model_backed(kind, vocab[best], p))
}

fn is_distribution(scores: &[f32]) -> bool {
    let sum: f32 = scores.iter().sum();
    scores.iter().all(|&s| (0.0..=1.0).contains(&s)) && (sum - 1.0).abs() < PROBABILITY_SUM_TOLERANCE
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// ONNX image classifier for one attribute.
pub struct OnnxClassifier {
    kind: AttributeKind,
    session: Session,
}

impl OnnxClassifier {
    /// Load the classifier for `kind` from `model_path`.
    pub fn load(kind: AttributeKind, model_path: &Path, intra_threads: usize) -> Result<Self, AnalysisError> {
        if !model_path.exists() {
            return Err(AnalysisError::ArtifactUnavailable(kind));
        }

        let session = Session::builder()
            .map_err(|e| AnalysisError::load(kind, e))?
            .with_intra_threads(intra_threads)
            .map_err(|e| AnalysisError::load(kind, e))?
            .commit_from_file(model_path)
            .map_err(|e| AnalysisError::load(kind, e))?;

        let outputs = session.outputs().len();
        if outputs == 0 {
            return Err(AnalysisError::load(kind, "model declares no outputs"));
        }

        tracing::info!(
            %kind,
            path = %model_path.display(),
            inputs = ?session.inputs().iter().map(|i| (i.name(), i.dtype())).collect::<Vec<_>>(),
            outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
            "loaded attribute model"
        );

        Ok(Self { kind, session })
    }

    /// Resize to the classifier input and normalize into a NCHW float tensor.
    fn preprocess(image: &ImageFrame) -> Option<Array4<f32>> {
        let rgb = image.to_rgb_image()?;
        let resized = image::imageops::resize(
            &rgb,
            CLASSIFIER_INPUT_SIZE,
            CLASSIFIER_INPUT_SIZE,
            FilterType::Triangle,
        );

        let size = CLASSIFIER_INPUT_SIZE as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                let v = pixel[c] as f32 / 255.0;
                tensor[[0, c, y as usize, x as usize]] = (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            }
        }
        Some(tensor)
    }
}

impl AttributeModel for OnnxClassifier {
    fn infer(&mut self, image: &ImageFrame) -> Result<Vec<f32>, AnalysisError> {
        let kind = self.kind;
        let input = Self::preprocess(image)
            .ok_or_else(|| AnalysisError::InvalidImage("buffer does not match dimensions".into()))?;

        let tensor = TensorRef::from_array_view(input.view()).map_err(|e| AnalysisError::inference(kind, e))?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| AnalysisError::inference(kind, e))?;

        let (_, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AnalysisError::inference(kind, format!("score extraction: {e}")))?;

        Ok(scores.to_vec())
    }
}

/// Default loader: an ONNX Runtime session per artifact.
#[derive(Debug, Clone)]
pub struct OnnxLoader {
    pub intra_threads: usize,
}

impl Default for OnnxLoader {
    fn default() -> Self {
        Self { intra_threads: 2 }
    }
}

impl ModelLoader for OnnxLoader {
    fn load(&self, kind: AttributeKind, path: &Path) -> Result<Box<dyn AttributeModel>, AnalysisError> {
        Ok(Box::new(OnnxClassifier::load(kind, path, self.intra_threads)?))
    }
}

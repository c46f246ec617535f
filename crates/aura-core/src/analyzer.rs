//! Attribute analyzer: routes each request to the model-backed or heuristic path.
//!
//! The path is chosen per request from the registry's availability snapshot.
//! Model handles are loaded lazily, at most once per kind on success, and kept
//! for the life of the analyzer. Any failure on the model path (load, inference,
//! output shape, a panic inside the runtime) is logged and the request is
//! answered by the fallback path instead. Availability never changes after
//! startup, so a failed load is simply retried by the next request.
//!
//! Caught panics still go through the process panic hook first, so the
//! default hook prints its message to stderr outside of `tracing`.

use crate::error::AnalysisError;
use crate::fallback;
use crate::frame::ImageFrame;
use crate::model::{classify, AttributeModel, ModelLoader, OnnxLoader};
use crate::registry::{ModelAvailability, ModelRegistry};
use crate::types::{AttributeKind, AttributeResult, Gender};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

/// Per-request hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    pub gender: Gender,
}

/// Which implementation serves a request for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPath {
    ModelBacked,
    Fallback,
}

/// Lazily initialized, inference-serialized model handle for one kind.
type ModelSlot = OnceCell<Mutex<Box<dyn AttributeModel>>>;

/// Availability and load state of one kind, for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct KindStatus {
    pub kind: AttributeKind,
    pub available: bool,
    pub loaded: bool,
    pub artifact: String,
}

pub struct Analyzer {
    registry: ModelRegistry,
    loader: Box<dyn ModelLoader>,
    slots: [ModelSlot; 3],
}

impl Analyzer {
    /// Analyzer backed by ONNX Runtime sessions.
    pub fn new(registry: ModelRegistry) -> Self {
        Self::with_loader(registry, OnnxLoader::default())
    }

    pub fn with_loader(registry: ModelRegistry, loader: impl ModelLoader + 'static) -> Self {
        Self {
            registry,
            loader: Box::new(loader),
            slots: [OnceCell::new(), OnceCell::new(), OnceCell::new()],
        }
    }

    pub fn availability(&self) -> ModelAvailability {
        self.registry.availability()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn path_for(&self, kind: AttributeKind) -> AnalysisPath {
        if self.registry.is_available(kind) {
            AnalysisPath::ModelBacked
        } else {
            AnalysisPath::Fallback
        }
    }

    /// Analyze one attribute with default options.
    pub fn analyze(&self, image: Option<&ImageFrame>, kind: AttributeKind) -> AttributeResult {
        self.analyze_with(image, kind, &AnalysisOptions::default())
    }

    /// Analyze one attribute. Never fails.
    pub fn analyze_with(
        &self,
        image: Option<&ImageFrame>,
        kind: AttributeKind,
        options: &AnalysisOptions,
    ) -> AttributeResult {
        let image = match validate(image) {
            Ok(img) => img,
            Err(err) => {
                tracing::warn!(%kind, error = %err, "unusable image; returning degraded default");
                return AttributeResult::degraded(kind);
            }
        };

        match self.path_for(kind) {
            AnalysisPath::ModelBacked => match self.run_model(kind, image) {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "model path failed; falling back for this request");
                    fallback::fallback(kind, Some(image), options.gender, &mut rand::thread_rng())
                }
            },
            AnalysisPath::Fallback => {
                fallback::fallback(kind, Some(image), options.gender, &mut rand::thread_rng())
            }
        }
    }

    /// Analyze several kinds in order. Repeated kinds are analyzed once.
    pub fn analyze_all(
        &self,
        image: Option<&ImageFrame>,
        kinds: &[AttributeKind],
        options: &AnalysisOptions,
    ) -> Vec<AttributeResult> {
        let mut seen = [false; 3];
        kinds
            .iter()
            .filter(|k| !std::mem::replace(&mut seen[k.index()], true))
            .map(|&kind| self.analyze_with(image, kind, options))
            .collect()
    }

    pub fn status(&self) -> Vec<KindStatus> {
        AttributeKind::ALL
            .iter()
            .map(|&kind| KindStatus {
                kind,
                available: self.registry.is_available(kind),
                loaded: self.slots[kind.index()].get().is_some(),
                artifact: self.registry.artifact_path(kind).display().to_string(),
            })
            .collect()
    }

    /// Load (once) and run the model for `kind`. Panics from the runtime are
    /// caught and reported as inference failures.
    fn run_model(&self, kind: AttributeKind, image: &ImageFrame) -> Result<AttributeResult, AnalysisError> {
        catch_unwind(AssertUnwindSafe(|| {
            let handle = self.model_handle(kind)?;
            // A panic during an earlier inference poisons the lock; the session
            // itself is still usable.
            let mut model = handle.lock().unwrap_or_else(PoisonError::into_inner);
            let scores = model.infer(image)?;
            drop(model);
            classify(kind, &scores)
        }))
        .unwrap_or_else(|panic| Err(AnalysisError::inference(kind, panic_message(panic.as_ref()))))
    }

    fn model_handle(&self, kind: AttributeKind) -> Result<&Mutex<Box<dyn AttributeModel>>, AnalysisError> {
        self.slots[kind.index()].get_or_try_init(|| {
            let path = self.registry.artifact_path(kind);
            tracing::info!(%kind, path = %path.display(), "loading attribute model");
            self.loader.load(kind, &path).map(Mutex::new)
        })
    }
}

fn validate(image: Option<&ImageFrame>) -> Result<&ImageFrame, AnalysisError> {
    let image = image.ok_or_else(|| AnalysisError::InvalidImage("no image".into()))?;
    image.validate().map_err(AnalysisError::InvalidImage)?;
    Ok(image)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

//! aura-core — Attribute analysis and style recommendation engine.
//!
//! Infers body shape, face shape and skin tone from an image using ONNX
//! classifiers when their artifacts are present, and heuristic estimates when
//! they are not. Both paths produce the same result shape, marked with
//! `using_fallback`, and feed a catalog-backed recommender.

pub mod analyzer;
pub mod catalog;
pub mod error;
pub mod fallback;
pub mod frame;
pub mod model;
pub mod recommend;
pub mod registry;
pub mod style;
pub mod types;

pub use analyzer::{AnalysisOptions, AnalysisPath, Analyzer, KindStatus};
pub use catalog::{Catalog, Product, StaticCatalog};
pub use error::{AnalysisError, CatalogError, RequestError};
pub use frame::ImageFrame;
pub use model::{AttributeModel, ModelLoader, OnnxLoader};
pub use recommend::{ProductRef, Recommendation, RecommendationRequest, Recommender};
pub use registry::{ModelAvailability, ModelRegistry};
pub use types::{AttributeKind, AttributeResult, ConfidenceBand, Gender, FALLBACK_BAND, MODEL_BAND};

use std::path::PathBuf;

/// Default model directory: `$XDG_DATA_HOME/aura/models`, else `~/.local/share/aura/models`.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("aura")
        .join("models")
}

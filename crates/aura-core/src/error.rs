use crate::types::AttributeKind;
use thiserror::Error;

/// Ways the model-backed path can fail. None of these reach the caller of
/// [`Analyzer::analyze`](crate::Analyzer::analyze); every variant routes to fallback.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("no model artifact for {0}")]
    ArtifactUnavailable(AttributeKind),
    #[error("failed to load {kind} model: {reason}")]
    ArtifactLoad { kind: AttributeKind, reason: String },
    #[error("{kind} inference failed: {reason}")]
    Inference { kind: AttributeKind, reason: String },
    #[error("invalid image input: {0}")]
    InvalidImage(String),
}

impl AnalysisError {
    pub fn load(kind: AttributeKind, reason: impl std::fmt::Display) -> Self {
        AnalysisError::ArtifactLoad {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn inference(kind: AttributeKind, reason: impl std::fmt::Display) -> Self {
        AnalysisError::Inference {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Rejected recommendation request.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("more than one result for {0}")]
    DuplicateKind(AttributeKind),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate product id: {0}")]
    DuplicateId(String),
}

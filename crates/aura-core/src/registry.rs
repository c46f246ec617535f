//! Model registry: one-shot probe of the model directory.
//!
//! Availability is decided once at startup and never re-probed. Probe errors
//! (permissions, I/O) mark the kind unavailable so requests route to the
//! heuristic path instead of attempting a broken load.

use crate::types::AttributeKind;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Immutable per-kind availability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelAvailability {
    flags: [bool; 3],
}

impl ModelAvailability {
    pub const fn none() -> Self {
        Self { flags: [false; 3] }
    }

    pub const fn all() -> Self {
        Self { flags: [true; 3] }
    }

    /// Build a snapshot from explicit flags.
    pub fn from_fn(f: impl Fn(AttributeKind) -> bool) -> Self {
        let mut flags = [false; 3];
        for kind in AttributeKind::ALL {
            flags[kind.index()] = f(kind);
        }
        Self { flags }
    }

    pub fn is_available(&self, kind: AttributeKind) -> bool {
        self.flags[kind.index()]
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

impl Serialize for ModelAvailability {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(3))?;
        for kind in AttributeKind::ALL {
            map.serialize_entry(kind.as_str(), &self.is_available(kind))?;
        }
        map.end()
    }
}

/// Probed artifact locations plus the availability snapshot.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    model_dir: PathBuf,
    availability: ModelAvailability,
}

impl ModelRegistry {
    /// Probe `model_dir` for each kind's artifact.
    pub fn probe(model_dir: &Path) -> Self {
        let availability = ModelAvailability::from_fn(|kind| {
            probe_artifact(kind, &model_dir.join(kind.artifact_name()))
        });

        if availability.count() == AttributeKind::ALL.len() {
            tracing::info!(dir = %model_dir.display(), "all model artifacts found");
        } else {
            tracing::warn!(
                dir = %model_dir.display(),
                available = availability.count(),
                total = AttributeKind::ALL.len(),
                "some model artifacts missing; those attributes use heuristic fallback"
            );
        }

        Self {
            model_dir: model_dir.to_path_buf(),
            availability,
        }
    }

    /// Registry with fixed availability, for callers that supply their own loader.
    pub fn with_availability(model_dir: &Path, availability: ModelAvailability) -> Self {
        Self {
            model_dir: model_dir.to_path_buf(),
            availability,
        }
    }

    pub fn is_available(&self, kind: AttributeKind) -> bool {
        self.availability.is_available(kind)
    }

    pub fn availability(&self) -> ModelAvailability {
        self.availability
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Where the artifact for `kind` is (or would be).
    pub fn artifact_path(&self, kind: AttributeKind) -> PathBuf {
        self.model_dir.join(kind.artifact_name())
    }
}

/// A kind is available only if its artifact is a non-empty regular file.
fn probe_artifact(kind: AttributeKind, path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_file() => {
            tracing::warn!(%kind, path = %path.display(), "model artifact is not a regular file");
            false
        }
        Ok(meta) if meta.len() == 0 => {
            // Placeholder left by an unconfigured download.
            tracing::warn!(%kind, path = %path.display(), "model artifact is empty");
            false
        }
        Ok(meta) => {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            tracing::info!(%kind, path = %path.display(), size_mb = format!("{size_mb:.2}"), "model artifact found");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(%kind, path = %path.display(), "model artifact missing");
            false
        }
        Err(e) => {
            tracing::warn!(%kind, path = %path.display(), error = %e, "model artifact probe failed");
            false
        }
    }
}

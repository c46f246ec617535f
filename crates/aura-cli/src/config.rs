use aura_core::Gender;
use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory probed for `body_shape.onnx`, `face_shape.onnx`, `skin_tone.onnx`.
    pub model_dir: PathBuf,
    /// Product catalog file (TOML or JSON). Built-in catalog when unset.
    pub catalog_path: Option<PathBuf>,
    /// Number of products per recommendation.
    pub recommend_limit: usize,
    /// ONNX Runtime intra-op threads per model session.
    pub intra_threads: usize,
    /// Gender assumed when a command doesn't specify one.
    pub default_gender: Gender,
}

impl Config {
    /// Load configuration from `AURA_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("AURA_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| aura_core::default_model_dir());

        let default_gender = match std::env::var("AURA_DEFAULT_GENDER") {
            Ok(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid AURA_DEFAULT_GENDER; using female");
                Gender::Female
            }),
            Err(_) => Gender::Female,
        };

        Self {
            model_dir,
            catalog_path: std::env::var("AURA_CATALOG_PATH").ok().map(PathBuf::from),
            recommend_limit: env_usize("AURA_RECOMMEND_LIMIT", aura_core::recommend::DEFAULT_LIMIT),
            intra_threads: env_usize("AURA_INTRA_THREADS", 2).max(1),
            default_gender,
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_usize_parses_and_defaults() {
        std::env::set_var("AURA_TEST_LIMIT_OK", "9");
        std::env::set_var("AURA_TEST_LIMIT_BAD", "nine");
        assert_eq!(env_usize("AURA_TEST_LIMIT_OK", 6), 9);
        assert_eq!(env_usize("AURA_TEST_LIMIT_BAD", 6), 6);
        assert_eq!(env_usize("AURA_TEST_LIMIT_UNSET", 6), 6);
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration, fixed when the pipeline is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Insert the quad-to-triangle stage ahead of tangent generation.
    pub triangulate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { triangulate: true }
    }
}

/// Errors from loading a [`PipelineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_triangulates() {
        assert!(PipelineConfig::default().triangulate);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = PipelineConfig { triangulate: false };
        config.save(tmp.path()).unwrap();

        let loaded = PipelineConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_json_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "triangulate = yes").unwrap();
        assert!(matches!(
            PipelineConfig::load(tmp.path()),
            Err(ConfigError::Json(_))
        ));
    }
}

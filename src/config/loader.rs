//! Policy configuration loading.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::PolicyConfig;

impl PolicyConfig {
    /// Loads policy configuration from a YAML file.
    ///
    /// Every section and field is optional; anything absent falls back to
    /// the documented default.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use workforce_engine::config::PolicyConfig;
    ///
    /// let policy = PolicyConfig::load("./config/policy.yaml")?;
    /// # Ok::<(), workforce_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content).map_err(|e| match e {
            EngineError::ConfigParse { message, .. } => EngineError::ConfigParse {
                path: path_str,
                message,
            },
            other => other,
        })
    }

    /// Parses policy configuration from a YAML string.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }
}

//! Run configuration, optionally loaded from `codeatlas.toml`

use crate::aggregation::HealthPolicy;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "codeatlas.toml";

/// Whether a function's complexity includes decision points of functions nested in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityScope {
    /// Nested function bodies count toward every enclosing function.
    #[default]
    Inclusive,
    /// The walk stops at nested function boundaries.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Deepest folder level descended into when flattening or ingesting.
    pub max_depth: Option<usize>,
    /// Upper bound on concurrent per-file fetch + parse work.
    pub max_parallel_fetches: usize,
    /// Abandon the run after this many seconds.
    pub timeout_secs: Option<u64>,
    pub complexity_scope: ComplexityScope,
    pub health: HealthPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            max_depth: Some(3),
            max_parallel_fetches: 8,
            timeout_secs: None,
            complexity_scope: ComplexityScope::default(),
            health: HealthPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(text).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load `dir/codeatlas.toml` if it exists, defaults otherwise.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_parallel_fetches == 0 {
            return Err(AnalysisError::Config(
                "max_parallel_fetches must be at least 1".to_string(),
            ));
        }
        if !(self.health.loc_divisor > 0.0) {
            return Err(AnalysisError::Config(
                "health.loc_divisor must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

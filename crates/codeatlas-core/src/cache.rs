//! Cache of finished graphs keyed by repository identity

use crate::model::Graph;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cache directory: .codeatlas/
pub const CACHE_DIR: &str = ".codeatlas";

/// One cached graph with the metadata needed to judge it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedGraph {
    pub key: String,
    pub version: String,
    pub health_policy_version: u32,
    pub cached_at: chrono::DateTime<chrono::Utc>,
    /// Ingestion-side facts stored next to the graph (repository metadata).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub graph: Graph,
}

impl CachedGraph {
    pub fn new(key: &str, graph: Graph, health_policy_version: u32) -> Self {
        CachedGraph {
            key: key.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            health_policy_version,
            cached_at: chrono::Utc::now(),
            metadata: None,
            graph,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Get cache directory path
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

/// Cache file for a repository identity (URL, path, ...).
pub fn graph_cache_path(root: &Path, key: &str) -> PathBuf {
    let file: String = key
        .trim_end_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    cache_dir(root).join(format!("{file}.json"))
}

/// Store `graph` under `key`, replacing any previous entry.
pub fn save_graph(root: &Path, key: &str, graph: &Graph, health_policy_version: u32) -> anyhow::Result<()> {
    save_entry(root, &CachedGraph::new(key, graph.clone(), health_policy_version))
}

/// Store a prepared entry under its own key.
pub fn save_entry(root: &Path, entry: &CachedGraph) -> anyhow::Result<()> {
    std::fs::create_dir_all(cache_dir(root))?;
    let path = graph_cache_path(root, &entry.key);

    let json_str = serde_json::to_string_pretty(entry)?;
    std::fs::write(&path, json_str)
        .with_context(|| format!("writing graph cache {}", path.display()))?;

    tracing::debug!("Graph cache saved: {}", path.display());
    Ok(())
}

/// Load the graph cached under `key`, if any.
pub fn load_graph(root: &Path, key: &str) -> anyhow::Result<Option<CachedGraph>> {
    let path = graph_cache_path(root, key);
    if !path.exists() {
        return Ok(None);
    }

    let json_str = std::fs::read_to_string(&path)?;
    let entry: CachedGraph = serde_json::from_str(&json_str)
        .with_context(|| format!("reading graph cache {}", path.display()))?;

    if entry.key != key {
        tracing::debug!("Cache file {} belongs to {}, ignoring", path.display(), entry.key);
        return Ok(None);
    }

    tracing::debug!("Graph cache loaded from: {}", path.display());
    Ok(Some(entry))
}

/// Clear cache directory
pub fn clear_cache(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}

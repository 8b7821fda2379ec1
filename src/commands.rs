//! CLI command implementations

use anyhow::Context;
use codeatlas_core::{
    AnalysisConfig, AnalysisError, CachedGraph, FileTree, Graph, flatten, load_graph, save_entry,
};
use codeatlas_indexer::{ContentFetcher, Coordinator, FsFetcher, scan_directory};
use codeatlas_remote::{GithubClient, HttpFetcher, RepoLocator};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct AnalyzeRequest {
    pub target: Option<String>,
    pub tree: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub refresh: bool,
}

/// What an analysis target names.
#[derive(Debug, PartialEq)]
pub enum Target {
    Local(PathBuf),
    Github(RepoLocator),
}

impl Target {
    /// An existing directory wins; anything else must be a GitHub URL.
    pub fn classify(root: &Path, target: Option<&str>) -> Result<Self, AnalysisError> {
        let Some(target) = target else {
            return Ok(Target::Local(root.to_path_buf()));
        };
        let path = Path::new(target);
        if path.is_dir() {
            return Ok(Target::Local(path.to_path_buf()));
        }
        RepoLocator::parse(target).map(Target::Github)
    }
}

pub async fn analyze(root: PathBuf, request: AnalyzeRequest) -> anyhow::Result<()> {
    let config = AnalysisConfig::load_or_default(&root)?;

    let report = match &request.tree {
        Some(tree_path) => analyze_tree_file(&config, tree_path).await?,
        None => match Target::classify(&root, request.target.as_deref())? {
            Target::Local(dir) => analyze_local(&config, &dir).await?,
            Target::Github(locator) => analyze_github(&root, &config, &locator, request.refresh).await?,
        },
    };

    let json_str = serde_json::to_string_pretty(&report)?;
    match &request.output {
        Some(path) => {
            std::fs::write(path, json_str)
                .with_context(|| format!("writing graph to {}", path.display()))?;
            tracing::info!("Graph written to {}", path.display());
        }
        None => println!("{}", json_str),
    }
    Ok(())
}

fn report(repository: Option<Value>, cached: bool, graph: &Graph) -> Value {
    json!({
        "repository": repository,
        "cached": cached,
        "graph": graph,
    })
}

async fn run(config: &AnalysisConfig, fetcher: Arc<dyn ContentFetcher>, tree: &FileTree) -> anyhow::Result<Graph> {
    let graph = Coordinator::new(config.clone(), fetcher).run(tree).await?;
    Ok(graph)
}

async fn analyze_local(config: &AnalysisConfig, dir: &Path) -> anyhow::Result<Value> {
    tracing::info!("Analyzing directory: {}", dir.display());
    let tree = scan_directory(dir, config.max_depth)?;
    let graph = run(config, Arc::new(FsFetcher::new(dir)), &tree).await?;
    Ok(report(None, false, &graph))
}

/// A tree document whose entries carry download URLs is fetched over HTTP;
/// otherwise handles are read relative to the document's directory.
async fn analyze_tree_file(config: &AnalysisConfig, path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading file tree {}", path.display()))?;
    let tree: FileTree = serde_json::from_str(&text).map_err(AnalysisError::from)?;

    let remote = flatten(&tree, None).files.iter().any(|f| {
        f.content_handle
            .as_deref()
            .is_some_and(|h| h.starts_with("http://") || h.starts_with("https://"))
    });
    let fetcher: Arc<dyn ContentFetcher> = if remote {
        Arc::new(HttpFetcher::new(std::env::var("GITHUB_TOKEN").ok()))
    } else {
        let base = path.parent().unwrap_or(Path::new("."));
        Arc::new(FsFetcher::new(base))
    };

    let graph = run(config, fetcher, &tree).await?;
    Ok(report(None, false, &graph))
}

async fn analyze_github(
    root: &Path,
    config: &AnalysisConfig,
    locator: &RepoLocator,
    refresh: bool,
) -> anyhow::Result<Value> {
    let key = locator.cache_key();

    if !refresh {
        match load_graph(root, &key) {
            Ok(Some(entry)) if entry.health_policy_version == config.health.version => {
                tracing::info!("Using graph of {} cached at {}", locator, entry.cached_at);
                return Ok(report(entry.metadata, true, &entry.graph));
            }
            Ok(Some(entry)) => tracing::debug!(
                "Cached graph of {} was scored with policy v{}, analyzing again",
                locator,
                entry.health_policy_version
            ),
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable cache for {}: {:#}", locator, e),
        }
    }

    let client = GithubClient::from_env();
    let (metadata, tree) = client
        .fetch_repository(locator, config.max_depth, config.max_parallel_fetches)
        .await?;
    let fetcher = Arc::new(HttpFetcher::new(client.token().map(str::to_string)));
    let graph = run(config, fetcher, &tree).await?;

    let metadata = serde_json::to_value(&metadata)?;
    let entry = CachedGraph::new(&key, graph, config.health.version).with_metadata(metadata);
    if let Err(e) = save_entry(root, &entry) {
        tracing::warn!("Failed to cache graph of {}: {:#}", locator, e);
    }
    Ok(report(entry.metadata, false, &entry.graph))
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Clearing cache for: {}", root.display());

    codeatlas_core::clear_cache(&root)?;

    tracing::info!("Cache cleared");
    Ok(())
}

//! Orchestrates one analysis run
//!
//! Files are fetched and extracted concurrently, bounded by
//! `max_parallel_fetches`, with results kept in tree order. Parsing runs on
//! the blocking pool. Resolution and assembly start once every file is done.

use crate::assembler::{ResolvedFile, assemble};
use crate::extractor::{FilePartial, FileStatus, count_lines};
use crate::fetch::ContentFetcher;
use crate::languages::get_extractor;
use codeatlas_core::{AnalysisConfig, AnalysisError, FileDescriptor, FileTree, Graph, flatten};
use futures_util::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use std::time::Instant;

pub struct Coordinator {
    config: AnalysisConfig,
    fetcher: Arc<dyn ContentFetcher>,
}

impl Coordinator {
    pub fn new(config: AnalysisConfig, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Coordinator { config, fetcher }
    }

    /// Analyze `tree`, bounded by the configured timeout if any.
    pub async fn run(&self, tree: &FileTree) -> Result<Graph, AnalysisError> {
        match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, self.analyze(tree))
                .await
                .map_err(|_| AnalysisError::Timeout(limit))?,
            None => self.analyze(tree).await,
        }
    }

    async fn analyze(&self, tree: &FileTree) -> Result<Graph, AnalysisError> {
        let started = Instant::now();
        let flat = flatten(tree, self.config.max_depth);
        if flat.is_empty() {
            return Err(AnalysisError::EmptyTree);
        }
        tracing::debug!("Analyzing {} files", flat.len());

        let partials: Vec<FilePartial> = stream::iter(flat.files.iter().cloned())
            .map(|file| self.process_file(file))
            .buffered(self.config.max_parallel_fetches.max(1))
            .try_collect()
            .await?;

        let degraded = partials
            .iter()
            .filter(|p| matches!(p.status, FileStatus::FetchFailed | FileStatus::ParseFailed))
            .count();

        let resolved: Vec<ResolvedFile> = partials
            .into_iter()
            .map(|partial| ResolvedFile::resolve(partial, &flat.paths))
            .collect();
        let graph = assemble(&resolved, &self.config.health);

        tracing::info!(
            "Analyzed {} files ({} degraded) into {} nodes and {} edges in {:?}",
            flat.len(),
            degraded,
            graph.node_count(),
            graph.edge_count(),
            started.elapsed()
        );
        Ok(graph)
    }

    /// Fetch, parse and extract one file. Per-file failures degrade the file
    /// to an opaque node; only a lost worker aborts the run.
    async fn process_file(&self, file: FileDescriptor) -> Result<FilePartial, AnalysisError> {
        let Some(extractor) = get_extractor(&file, self.config.complexity_scope) else {
            return Ok(FilePartial::opaque(file.path, file.size, FileStatus::NotSource));
        };

        let bytes = match self.fetcher.fetch(&file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {:#}", file.path, e);
                return Ok(FilePartial::opaque(file.path, 0, FileStatus::FetchFailed));
            }
        };

        tokio::task::spawn_blocking(move || {
            let content = String::from_utf8_lossy(&bytes);
            match extractor.extract(&file, &content) {
                Ok(partial) => partial,
                Err(e) => {
                    tracing::warn!("Failed to parse {}, keeping it opaque: {}", file.path, e);
                    FilePartial::opaque(file.path.as_str(), count_lines(&content), FileStatus::ParseFailed)
                }
            }
        })
        .await
        .map_err(|e| AnalysisError::Worker(e.to_string()))
    }
}

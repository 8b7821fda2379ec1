//! Integration tests for CodeAtlas
//!
//! These run a whole analysis over a project written to disk.

use codeatlas_core::{
    AnalysisConfig, CachedGraph, ComplexityScope, NodeType, Relation, clear_cache, load_graph, save_entry,
};
use codeatlas_indexer::{Coordinator, FsFetcher, scan_directory};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, ".gitignore", "node_modules/\n");
    write(root, "node_modules/react/index.js", "module.exports = {};\n");
    write(root, ".cache/junk.js", "function junk() {}\n");
    write(
        root,
        "src/index.ts",
        "import { Shape } from './shapes';\nimport lodash from 'lodash';\n\nexport function main(n: number) {\n  return n > 0 ? area(n) : 0;\n}\n\nfunction area(n: number) {\n  return n * n;\n}\n",
    );
    write(
        root,
        "src/shapes/index.js",
        "const util = require('../util');\n\nclass Shape {\n  area() { return 0; }\n}\n\nclass Square extends Shape {\n  side = 1;\n  area() { return this.side * this.side; }\n}\n\nmodule.exports = { Shape, Square };\n",
    );
    write(
        root,
        "src/util.jsx",
        "export default function () {\n  for (const x of []) { if (x) { continue; } }\n}\n",
    );
    write(root, "src/broken.tsx", "export const = ;\n<<<\n");
    write(root, "docs/guide.md", "# Guide\n");
    dir
}

async fn analyze(root: &Path, config: AnalysisConfig) -> codeatlas_core::Graph {
    let tree = scan_directory(root, config.max_depth).unwrap();
    Coordinator::new(config, Arc::new(FsFetcher::new(root)))
        .run(&tree)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_analyze_project_on_disk() {
    let project = sample_project();
    let graph = analyze(project.path(), AnalysisConfig::default()).await;

    // Ignored and hidden paths never reach the graph
    assert!(graph.nodes.iter().all(|n| !n.owning_file.starts_with("node_modules")));
    assert!(graph.node(".cache/junk.js").is_none());

    assert!(graph.has_edge("src/index.ts", "src/shapes/index.js", Relation::Import));
    assert!(graph.has_edge("src/index.ts", "lodash", Relation::Import));
    assert!(graph.has_edge("src/shapes/index.js", "src/util.jsx", Relation::Import));
    assert!(graph.has_edge("src/index.ts::fn::main", "src/index.ts::fn::area", Relation::Calls));
    assert!(graph.has_edge(
        "src/shapes/index.js::class::Square",
        "src/shapes/index.js::class::Shape",
        Relation::Extends
    ));

    assert_eq!(graph.node("lodash").unwrap().node_type, NodeType::Package);
    assert_eq!(graph.node("src/index.ts::fn::main").unwrap().complexity, 2);
    assert_eq!(graph.node("src/util.jsx::fn::<anonymous>").unwrap().complexity, 3);

    let broken = graph.node("src/broken.tsx").unwrap();
    assert_eq!(broken.complexity, 0);
    assert_eq!(broken.health_score, Some(100));
    assert_eq!(graph.edges_from("src/broken.tsx").count(), 0);

    assert_eq!(graph.node("docs/guide.md").unwrap().lines_of_code, 8);
}

#[tokio::test]
async fn test_config_file_controls_analysis() {
    let project = sample_project();
    write(
        project.path(),
        "codeatlas.toml",
        "max_depth = 0\ncomplexity_scope = \"exclusive\"\n",
    );

    let config = AnalysisConfig::load_or_default(project.path()).unwrap();
    assert_eq!(config.max_depth, Some(0));
    assert_eq!(config.complexity_scope, ComplexityScope::Exclusive);

    let graph = analyze(project.path(), config).await;
    assert!(graph.node("codeatlas.toml").is_some());
    assert!(graph.nodes.iter().all(|n| !n.owning_file.starts_with("src/")));
}

#[tokio::test]
async fn test_graph_cache_round_trip() {
    let project = sample_project();
    let cache_root = TempDir::new().unwrap();
    let config = AnalysisConfig::default();
    let graph = analyze(project.path(), config.clone()).await;

    let key = "github.com/acme/shapes";
    let entry = CachedGraph::new(key, graph.clone(), config.health.version)
        .with_metadata(serde_json::json!({"full_name": "acme/shapes"}));
    save_entry(cache_root.path(), &entry).unwrap();

    let loaded = load_graph(cache_root.path(), key).unwrap().unwrap();
    assert_eq!(loaded.graph, graph);
    assert_eq!(loaded.health_policy_version, config.health.version);
    assert_eq!(loaded.metadata.unwrap()["full_name"], "acme/shapes");

    clear_cache(cache_root.path()).unwrap();
    assert!(load_graph(cache_root.path(), key).unwrap().is_none());
}

#[tokio::test]
async fn test_repeated_runs_match() {
    let project = sample_project();
    let first = analyze(project.path(), AnalysisConfig::default()).await;
    let second = analyze(project.path(), AnalysisConfig::default()).await;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

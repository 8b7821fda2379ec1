//! CodeAtlas Core: graph data model, tree flattening, scoring and cache

pub mod model;
pub mod tree;
pub mod graph;
pub mod aggregation;
pub mod config;
pub mod cache;
pub mod error;


#[cfg(test)]
pub mod test_utils;

pub use model::{
    EntryKind, FileDescriptor, FileTree, Node, NodeType, Edge, Relation, Graph,
    class_id, function_id, SOURCE_EXTENSIONS,
};
pub use tree::{FlatTree, PathTable, build_tree, flatten, normalize_path};
pub use graph::GraphBuilder;
pub use aggregation::{HealthPolicy, roll_up_complexity, score_health};
pub use config::{AnalysisConfig, ComplexityScope, CONFIG_FILE};
pub use cache::{CACHE_DIR, cache_dir, graph_cache_path, save_graph, save_entry, load_graph, clear_cache, CachedGraph};
pub use error::{AnalysisError, Result};

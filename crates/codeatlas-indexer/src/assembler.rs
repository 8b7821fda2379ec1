//! Merge per-file partials into one scored graph

use crate::extractor::FilePartial;
use crate::resolver::{Resolution, resolve_import};
use codeatlas_core::{
    Edge, Graph, GraphBuilder, HealthPolicy, Node, PathTable, Relation, roll_up_complexity,
    score_health,
};

/// A partial whose import specifiers have been resolved against the tree.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub partial: FilePartial,
    /// One entry per `partial.imports`, same order.
    pub imports: Vec<Resolution>,
}

impl ResolvedFile {
    pub fn resolve(partial: FilePartial, paths: &PathTable) -> Self {
        let imports = partial
            .imports
            .iter()
            .map(|spec| resolve_import(spec, &partial.file, paths))
            .collect();
        ResolvedFile { partial, imports }
    }
}

/// Build the graph: nodes first, then edges, then complexity roll-up and
/// health scores. Runs on one thread; the builder is never shared.
pub fn assemble(files: &[ResolvedFile], policy: &HealthPolicy) -> Graph {
    let mut builder = GraphBuilder::new();

    for ResolvedFile { partial, .. } in files {
        let path = partial.file.as_str();
        let label = path.rsplit('/').next().unwrap_or(path);
        builder.upsert_node(Node::file(path, label, partial.lines_of_code));

        for class in &partial.classes {
            let methods = class.methods.iter().map(|m| m.name.clone()).collect();
            builder.upsert_node(Node::class(path, &class.name, methods));
        }
        for function in &partial.functions {
            builder.upsert_node(Node::function(path, &function.name, function.complexity));
        }
    }

    for ResolvedFile { partial, imports } in files {
        for target in imports {
            builder.add_edge(&Edge::new(partial.file.as_str(), target.target(), Relation::Import));
        }
        for edge in partial.extends.iter().chain(&partial.call_edges) {
            builder.add_edge(edge);
        }
    }

    roll_up_complexity(&mut builder);
    score_health(&mut builder, policy);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{FileStatus, FunctionInfo};
    use crate::parser::Dialect;
    use codeatlas_core::NodeType;

    fn partial(file: &str, loc: u64) -> FilePartial {
        FilePartial::opaque(file, loc, FileStatus::Parsed(Dialect::TypeScriptJsx))
    }

    #[test]
    fn test_assemble_resolves_and_scores() {
        let mut a = partial("src/a.js", 10);
        a.imports = vec!["./b".into(), "react".into()];
        a.functions = vec![
            FunctionInfo { name: "f".into(), complexity: 3 },
            FunctionInfo { name: "g".into(), complexity: 1 },
        ];
        let b = partial("src/b.ts", 1);

        let paths: PathTable = ["src/a.js", "src/b.ts"].iter().map(|p| p.to_string()).collect();
        let files: Vec<_> = [a, b].into_iter().map(|p| ResolvedFile::resolve(p, &paths)).collect();
        assert_eq!(files[0].imports[0], Resolution::Local("src/b.ts".into()));

        let graph = assemble(&files, &HealthPolicy::V1);

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["src/a.js", "src/a.js::fn::f", "src/a.js::fn::g", "src/b.ts", "react"]);
        assert!(graph.has_edge("src/a.js", "src/b.ts", Relation::Import));
        assert!(graph.has_edge("src/a.js", "react", Relation::Import));

        let a = graph.node("src/a.js").unwrap();
        assert_eq!(a.label, "a.js");
        assert_eq!(a.complexity, 4);
        // 100 - 24 - 16 - 0.05
        assert_eq!(a.health_score, Some(60));
        assert_eq!(graph.node("react").unwrap().node_type, NodeType::Package);
        assert_eq!(graph.node("src/b.ts").unwrap().health_score, Some(100));
    }

    #[test]
    fn test_duplicate_function_names_last_wins() {
        let mut a = partial("a.js", 1);
        a.functions = vec![
            FunctionInfo { name: "f".into(), complexity: 5 },
            FunctionInfo { name: "f".into(), complexity: 2 },
        ];
        let files = vec![ResolvedFile::resolve(a, &PathTable::default())];
        let graph = assemble(&files, &HealthPolicy::V1);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node("a.js::fn::f").unwrap().complexity, 2);
        assert_eq!(graph.node("a.js").unwrap().complexity, 2);
    }

    #[test]
    fn test_every_edge_endpoint_is_a_node() {
        let mut a = partial("a.js", 1);
        a.imports = vec!["./gone".into(), "lodash".into()];
        a.call_edges = vec![Edge::new("a.js::fn::x", "a.js::fn::y", Relation::Calls)];
        let files = vec![ResolvedFile::resolve(a, &PathTable::default())];
        let graph = assemble(&files, &HealthPolicy::V1);

        for edge in &graph.edges {
            assert!(graph.node(&edge.source).is_some(), "{}", edge.source);
            assert!(graph.node(&edge.target).is_some(), "{}", edge.target);
        }
        assert_eq!(graph.node("./gone").unwrap().node_type, NodeType::Package);
    }
}

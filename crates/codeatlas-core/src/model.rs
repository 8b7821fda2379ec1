//! Core data structures for the file tree and the code graph

use serde::{Deserialize, Serialize};

/// Extensions that place a file in the parseable ECMAScript family.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

/// Whether a tree entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One entry of a repository file tree, as supplied by the ingestion side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    /// Opaque handle the content fetcher understands (URL, relative path, ...).
    #[serde(default, alias = "download_url", skip_serializing_if = "Option::is_none")]
    pub content_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileDescriptor>,
}

impl FileDescriptor {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        FileDescriptor {
            name: file_name(&path).to_string(),
            content_handle: Some(path.clone()),
            path,
            kind: EntryKind::File,
            size,
            children: Vec::new(),
        }
    }

    pub fn folder(path: impl Into<String>, children: Vec<FileDescriptor>) -> Self {
        let path = path.into();
        FileDescriptor {
            name: file_name(&path).to_string(),
            path,
            kind: EntryKind::Folder,
            size: 0,
            content_handle: None,
            children,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Lowercased text after the last `.` of the name (the whole name if there is none).
    pub fn extension(&self) -> String {
        self.name.rsplit('.').next().unwrap_or_default().to_lowercase()
    }

    /// True when the extension places this file in the parseable source family.
    pub fn is_source_member(&self) -> bool {
        self.is_file() && SOURCE_EXTENSIONS.contains(&self.extension().as_str())
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Root list of a repository file tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    pub entries: Vec<FileDescriptor>,
}

impl FileTree {
    pub fn new(entries: Vec<FileDescriptor>) -> Self {
        FileTree { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Discriminates what kind of entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Class,
    Function,
    /// Placeholder for an edge endpoint outside the analyzed tree.
    Package,
}

/// A single node in the code graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub owning_file: String,
    pub lines_of_code: u64,
    pub complexity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<u8>,
    /// Member names, class nodes only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

impl Node {
    pub fn file(path: &str, label: &str, lines_of_code: u64) -> Self {
        Node {
            id: path.to_string(),
            label: label.to_string(),
            node_type: NodeType::File,
            owning_file: path.to_string(),
            lines_of_code,
            complexity: 0,
            health_score: None,
            methods: Vec::new(),
        }
    }

    pub fn class(path: &str, name: &str, methods: Vec<String>) -> Self {
        Node {
            id: class_id(path, name),
            label: name.to_string(),
            node_type: NodeType::Class,
            owning_file: path.to_string(),
            lines_of_code: 0,
            complexity: 0,
            health_score: None,
            methods,
        }
    }

    pub fn function(path: &str, name: &str, complexity: u32) -> Self {
        Node {
            id: function_id(path, name),
            label: name.to_string(),
            node_type: NodeType::Function,
            owning_file: path.to_string(),
            lines_of_code: 0,
            complexity,
            health_score: None,
            methods: Vec::new(),
        }
    }

    /// Placeholder for an id no file, class or function produced.
    pub fn package(id: &str) -> Self {
        Node {
            id: id.to_string(),
            label: id.to_string(),
            node_type: NodeType::Package,
            owning_file: String::new(),
            lines_of_code: 0,
            complexity: 0,
            health_score: Some(100),
            methods: Vec::new(),
        }
    }
}

pub fn class_id(path: &str, name: &str) -> String {
    format!("{path}::class::{name}")
}

pub fn function_id(path: &str, name: &str) -> String {
    format!("{path}::fn::{name}")
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Import,
    Extends,
    Calls,
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: Relation) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}

/// The finished graph of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All edges leaving `source`.
    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    pub fn has_edge(&self, source: &str, target: &str, relation: Relation) -> bool {
        self.edges_from(source)
            .any(|e| e.target == target && e.relation == relation)
    }
}

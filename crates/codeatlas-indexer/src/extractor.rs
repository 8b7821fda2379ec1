//! Language extractor trait and the per-file result it produces

use crate::parser::{Dialect, ParseError};
use codeatlas_core::{Edge, FileDescriptor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// How far processing of one file got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Parsed(Dialect),
    /// Every grammar rejected the source.
    ParseFailed,
    /// Content could not be retrieved.
    FetchFailed,
    /// Outside the parseable source family.
    NotSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub methods: Vec<MethodInfo>,
    /// Identifier after `extends`, when it is a plain name.
    pub superclass: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub complexity: u32,
}

/// Everything one file contributes to the graph, produced without touching
/// any shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePartial {
    pub file: String,
    pub lines_of_code: u64,
    /// Import specifiers as written, in source order.
    pub imports: Vec<String>,
    pub classes: Vec<ClassInfo>,
    pub functions: Vec<FunctionInfo>,
    pub extends: Vec<Edge>,
    pub call_edges: Vec<Edge>,
    pub status: FileStatus,
}

impl FilePartial {
    /// A file node with no symbols, imports or edges.
    pub fn opaque(file: impl Into<String>, lines_of_code: u64, status: FileStatus) -> Self {
        FilePartial {
            file: file.into(),
            lines_of_code,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            extends: Vec::new(),
            call_edges: Vec::new(),
            status,
        }
    }
}

/// Number of lines in `content`: newline count plus one.
pub fn count_lines(content: &str) -> u64 {
    content.bytes().filter(|b| *b == b'\n').count() as u64 + 1
}

pub trait LanguageExtractor: Send + Sync {
    fn extract(&self, file: &FileDescriptor, content: &str) -> Result<FilePartial, ExtractError>;
}

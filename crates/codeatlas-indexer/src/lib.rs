//! ECMAScript parsing, symbol extraction and graph assembly

pub mod syntax;
pub mod parser;
pub mod complexity;
pub mod extractor;
pub mod languages;
pub mod resolver;
pub mod assembler;
pub mod fetch;
pub mod local;
pub mod coordinator;


pub use parser::{Dialect, ParseError, ParsedSource, parse_source};
pub use complexity::cyclomatic;
pub use extractor::{ClassInfo, ExtractError, FilePartial, FileStatus, FunctionInfo, LanguageExtractor, MethodInfo};
pub use resolver::{Resolution, resolve_import};
pub use assembler::{ResolvedFile, assemble};
pub use fetch::{ContentFetcher, FsFetcher, MemoryFetcher};
pub use local::scan_directory;
pub use coordinator::Coordinator;

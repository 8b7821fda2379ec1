//! Source parsing with an ordered list of grammar strategies
//!
//! The permissive TSX grammar (module syntax, JSX, class fields, optional
//! chaining, type annotations) is tried first; the plain JavaScript grammar
//! (script syntax with JSX) is the fallback. A tree containing error or
//! missing nodes counts as a failed attempt.

use std::fmt;
use thiserror::Error;
use tree_sitter::{Language, Parser, Tree};

/// A grammar the parser can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    TypeScriptJsx,
    JavaScriptJsx,
}

impl Dialect {
    /// Strategies in the order they are attempted.
    pub const FALLBACK_ORDER: [Dialect; 2] = [Dialect::TypeScriptJsx, Dialect::JavaScriptJsx];

    pub fn language(self) -> Language {
        match self {
            Dialect::TypeScriptJsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::JavaScriptJsx => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::TypeScriptJsx => "tsx",
            Dialect::JavaScriptJsx => "javascript",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load {dialect} grammar: {reason}")]
    Grammar { dialect: Dialect, reason: String },

    #[error("{dialect} parser produced no tree")]
    NoTree { dialect: Dialect },

    #[error("syntax error under {dialect} grammar")]
    Syntax { dialect: Dialect },

    #[error("no grammar accepted the source ({})", join_errors(.0))]
    Exhausted(Vec<ParseError>),
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A syntax tree together with the grammar that produced it.
#[derive(Debug)]
pub struct ParsedSource {
    pub tree: Tree,
    pub dialect: Dialect,
}

/// Parse `source` with exactly one grammar.
pub fn parse_with(dialect: Dialect, source: &str) -> Result<ParsedSource, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|e| ParseError::Grammar {
            dialect,
            reason: e.to_string(),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or(ParseError::NoTree { dialect })?;

    if tree.root_node().has_error() {
        return Err(ParseError::Syntax { dialect });
    }
    Ok(ParsedSource { tree, dialect })
}

/// Run `attempt` over `strategies` in order and return the first success,
/// or every failure when none succeeds.
pub fn first_success<S, T, E, F>(strategies: impl IntoIterator<Item = S>, mut attempt: F) -> Result<T, Vec<E>>
where
    F: FnMut(S) -> Result<T, E>,
{
    let mut failures = Vec::new();
    for strategy in strategies {
        match attempt(strategy) {
            Ok(value) => return Ok(value),
            Err(e) => failures.push(e),
        }
    }
    Err(failures)
}

/// Parse `source` with the first grammar of [`Dialect::FALLBACK_ORDER`] that accepts it.
pub fn parse_source(source: &str) -> Result<ParsedSource, ParseError> {
    first_success(Dialect::FALLBACK_ORDER, |dialect| {
        let result = parse_with(dialect, source);
        if let Err(e) = &result {
            tracing::trace!("Parse attempt failed: {}", e);
        }
        result
    })
    .map_err(ParseError::Exhausted)
}

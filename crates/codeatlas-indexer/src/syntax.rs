//! Typed view over the tree-sitter node kinds the indexer cares about
//!
//! tree-sitter exposes node kinds as strings. Every walk in this crate goes
//! through [`Construct::of`] once and then matches exhaustively on the enum, so
//! the set of recognized ECMAScript constructs lives in one place.

use tree_sitter::Node;

/// The syntactic shape of a function-like node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionForm {
    /// `function f() {}`, `function* g() {}`
    Declaration,
    /// `function () {}`, `function* () {}` in expression position
    Expression,
    /// `() => {}`
    Arrow,
    /// Class or object method
    Method,
}

/// Constructs recognized by extraction and complexity analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Import,
    Call,
    /// Class declaration, including TypeScript `abstract class`
    ClassDeclaration,
    /// `class {}` in expression position
    ClassExpression,
    /// `name = value` inside `var`, `let` or `const`
    Declarator,
    Export,
    Function(FunctionForm),
    If,
    For,
    ForIn,
    ForOf,
    While,
    DoWhile,
    Ternary,
    Catch,
    /// `case x:`
    SwitchCase,
    /// `default:`
    SwitchDefault,
    /// `&&` or `||`
    Logical,
    Other,
}

impl Construct {
    pub fn of(node: &Node) -> Self {
        match node.kind() {
            "import_statement" => Construct::Import,
            "call_expression" => Construct::Call,
            "class_declaration" | "abstract_class_declaration" => Construct::ClassDeclaration,
            "class" if node.is_named() => Construct::ClassExpression,
            "variable_declarator" => Construct::Declarator,
            "export_statement" => Construct::Export,
            "function_declaration" | "generator_function_declaration" => {
                Construct::Function(FunctionForm::Declaration)
            }
            "function_expression" | "generator_function" => {
                Construct::Function(FunctionForm::Expression)
            }
            "function" if node.is_named() => Construct::Function(FunctionForm::Expression),
            "arrow_function" => Construct::Function(FunctionForm::Arrow),
            "method_definition" => Construct::Function(FunctionForm::Method),
            "if_statement" => Construct::If,
            "for_statement" => Construct::For,
            "for_in_statement" => match node.child_by_field_name("operator").map(|op| op.kind()) {
                Some("of") => Construct::ForOf,
                _ => Construct::ForIn,
            },
            "while_statement" => Construct::While,
            "do_statement" => Construct::DoWhile,
            "ternary_expression" => Construct::Ternary,
            "catch_clause" => Construct::Catch,
            "switch_case" => Construct::SwitchCase,
            "switch_default" => Construct::SwitchDefault,
            "binary_expression" => match node.child_by_field_name("operator").map(|op| op.kind()) {
                Some("&&") | Some("||") => Construct::Logical,
                _ => Construct::Other,
            },
            _ => Construct::Other,
        }
    }

    /// True for the constructs that add one path to a function's cyclomatic complexity.
    pub fn is_decision_point(self) -> bool {
        match self {
            Construct::If
            | Construct::For
            | Construct::ForIn
            | Construct::ForOf
            | Construct::While
            | Construct::DoWhile
            | Construct::Ternary
            | Construct::Catch
            | Construct::SwitchCase
            | Construct::Logical => true,
            Construct::Import
            | Construct::Call
            | Construct::ClassDeclaration
            | Construct::ClassExpression
            | Construct::Declarator
            | Construct::Export
            | Construct::Function(_)
            | Construct::SwitchDefault
            | Construct::Other => false,
        }
    }

    pub fn is_function(self) -> bool {
        matches!(self, Construct::Function(_))
    }
}

/// Source text of `node`, empty on invalid UTF-8.
pub fn text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

/// Value of a string literal node with its quotes removed.
pub fn string_value(node: &Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let raw = text(node, source);
    let quote = raw.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(inner.to_string())
}

//! Extractor for the ECMAScript family (.js, .jsx, .ts, .tsx)

use crate::complexity::cyclomatic;
use crate::extractor::{
    ClassInfo, ExtractError, FilePartial, FileStatus, FunctionInfo, LanguageExtractor, MethodInfo,
    count_lines,
};
use crate::parser::parse_source;
use crate::syntax::{Construct, FunctionForm, string_value, text};
use codeatlas_core::{ComplexityScope, Edge, FileDescriptor, Relation, class_id, function_id};
use std::collections::HashSet;
use std::rc::Rc;
use tree_sitter::Node;

/// Label for a default-exported class or function without a name.
pub const ANONYMOUS: &str = "<anonymous>";
/// Label for a class member whose key is not a plain name.
pub const UNKNOWN_MEMBER: &str = "<unknown>";

pub struct EcmaScriptExtractor {
    scope: ComplexityScope,
}

impl EcmaScriptExtractor {
    pub fn new(scope: ComplexityScope) -> Self {
        Self { scope }
    }
}

impl Default for EcmaScriptExtractor {
    fn default() -> Self {
        Self::new(ComplexityScope::default())
    }
}

/// A call to a bare identifier made from inside a declared function.
#[derive(Debug)]
struct CallSite {
    caller: String,
    callee: String,
}

/// Symbols of one file in source order.
#[derive(Debug, Default)]
struct Collected {
    imports: Vec<String>,
    classes: Vec<ClassInfo>,
    functions: Vec<FunctionInfo>,
    calls: Vec<CallSite>,
}

struct Walk<'s> {
    source: &'s [u8],
    scope: ComplexityScope,
}

impl Walk<'_> {
    /// Collect everything below `root` in pre-order.
    ///
    /// Each pending node carries the nearest declared function it sits in;
    /// anonymous functions and methods do not change it. The work list keeps
    /// deeply nested expressions in minified code off the call stack.
    fn visit(&self, root: Node) -> Collected {
        let mut found = Collected::default();
        let mut pending: Vec<(Node, Option<Rc<str>>)> = vec![(root, None)];
        let mut cursor = root.walk();

        while let Some((node, enclosing)) = pending.pop() {
            let mut declared: Option<Rc<str>> = None;

            match Construct::of(&node) {
                Construct::Import => {
                    if let Some(spec) = node
                        .child_by_field_name("source")
                        .and_then(|s| string_value(&s, self.source))
                    {
                        found.imports.push(spec);
                    }
                }
                Construct::Call => {
                    if let Some(spec) = self.require_specifier(&node) {
                        found.imports.push(spec);
                    }
                    if let (Some(caller), Some(callee)) = (enclosing.as_deref(), self.callee(&node)) {
                        found.calls.push(CallSite {
                            caller: caller.to_string(),
                            callee: callee.to_string(),
                        });
                    }
                }
                Construct::ClassDeclaration => {
                    let name = self.name_of(&node).unwrap_or(ANONYMOUS);
                    found.classes.push(self.class_info(&node, name));
                }
                Construct::ClassExpression if is_default_export(&node) => {
                    found.classes.push(self.class_info(&node, ANONYMOUS));
                }
                Construct::Function(FunctionForm::Declaration) => {
                    let name = self.name_of(&node).unwrap_or(ANONYMOUS).to_string();
                    found.functions.push(FunctionInfo {
                        name: name.clone(),
                        complexity: cyclomatic(&node, self.scope),
                    });
                    declared = Some(Rc::from(name));
                }
                Construct::Function(FunctionForm::Expression) if is_default_export(&node) => {
                    found.functions.push(FunctionInfo {
                        name: ANONYMOUS.to_string(),
                        complexity: cyclomatic(&node, self.scope),
                    });
                    declared = Some(Rc::from(ANONYMOUS));
                }
                Construct::Declarator => {
                    if let Some((name, function)) = self.function_binding(&node) {
                        found.functions.push(FunctionInfo {
                            name: name.to_string(),
                            complexity: cyclomatic(&function, self.scope),
                        });
                        declared = Some(Rc::from(name));
                    }
                }
                Construct::ClassExpression
                | Construct::Function(_)
                | Construct::Export
                | Construct::If
                | Construct::For
                | Construct::ForIn
                | Construct::ForOf
                | Construct::While
                | Construct::DoWhile
                | Construct::Ternary
                | Construct::Catch
                | Construct::SwitchCase
                | Construct::SwitchDefault
                | Construct::Logical
                | Construct::Other => {}
            }

            let inner = declared.or(enclosing);
            let children: Vec<Node> = node.children(&mut cursor).collect();
            pending.extend(children.into_iter().rev().map(|child| (child, inner.clone())));
        }
        found
    }

    fn name_of(&self, node: &Node) -> Option<&str> {
        node.child_by_field_name("name").map(|n| text(&n, self.source))
    }

    /// `require("x")` with exactly one string literal argument.
    fn require_specifier(&self, call: &Node) -> Option<String> {
        let callee = call.child_by_field_name("function")?;
        if callee.kind() != "identifier" || text(&callee, self.source) != "require" {
            return None;
        }
        let args = call.child_by_field_name("arguments")?;
        if args.named_child_count() != 1 {
            return None;
        }
        string_value(&args.named_child(0)?, self.source)
    }

    fn callee(&self, call: &Node) -> Option<&str> {
        let callee = call.child_by_field_name("function")?;
        (callee.kind() == "identifier").then(|| text(&callee, self.source))
    }

    /// `const name = () => {}` and `let name = function () {}`.
    fn function_binding<'t>(&self, declarator: &Node<'t>) -> Option<(&str, Node<'t>)> {
        let name = declarator.child_by_field_name("name")?;
        let value = declarator.child_by_field_name("value")?;
        if name.kind() != "identifier" {
            return None;
        }
        match Construct::of(&value) {
            Construct::Function(FunctionForm::Expression | FunctionForm::Arrow) => {
                Some((text(&name, self.source), value))
            }
            _ => None,
        }
    }

    fn class_info(&self, class: &Node, name: &str) -> ClassInfo {
        let methods: Vec<MethodInfo> = class
            .child_by_field_name("body")
            .map(|body| {
                let mut cursor = body.walk();
                body.named_children(&mut cursor)
                    .filter_map(|member| self.member_name(&member))
                    .map(|name| MethodInfo { name })
                    .collect()
            })
            .unwrap_or_default();

        ClassInfo {
            name: name.to_string(),
            methods,
            superclass: self.superclass(class),
        }
    }

    /// Name of a method or field; `None` for members that are skipped.
    fn member_name(&self, member: &Node) -> Option<String> {
        let key = match member.kind() {
            "method_definition" | "public_field_definition" => member.child_by_field_name("name"),
            "field_definition" => member.child_by_field_name("property"),
            _ => return None,
        };
        let Some(key) = key else {
            return Some(UNKNOWN_MEMBER.to_string());
        };
        let name = match key.kind() {
            "private_property_identifier" => return None,
            "property_identifier" | "identifier" => text(&key, self.source),
            "computed_property_name" => key
                .named_child(0)
                .filter(|inner| inner.kind() == "identifier")
                .map(|inner| text(&inner, self.source))
                .unwrap_or(UNKNOWN_MEMBER),
            _ => UNKNOWN_MEMBER,
        };
        Some(name.to_string())
    }

    /// The `extends` target when it is a plain identifier.
    fn superclass(&self, class: &Node) -> Option<String> {
        let mut cursor = class.walk();
        let heritage = class
            .named_children(&mut cursor)
            .find(|child| child.kind() == "class_heritage")?;
        let clause = heritage.named_child(0)?;
        // The TypeScript grammar wraps the expression in an extends_clause
        let target = if clause.kind() == "extends_clause" {
            clause.child_by_field_name("value")?
        } else {
            clause
        };
        (target.kind() == "identifier").then(|| text(&target, self.source).to_string())
    }
}

fn is_default_export(node: &Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if Construct::of(&parent) != Construct::Export {
        return false;
    }
    let mut cursor = parent.walk();
    parent.children(&mut cursor).any(|c| c.kind() == "default")
}

impl LanguageExtractor for EcmaScriptExtractor {
    fn extract(&self, file: &FileDescriptor, content: &str) -> Result<FilePartial, ExtractError> {
        let parsed = parse_source(content)?;
        let walk = Walk {
            source: content.as_bytes(),
            scope: self.scope,
        };
        let found = walk.visit(parsed.tree.root_node());
        let path = file.path.as_str();

        let class_names: HashSet<&str> = found.classes.iter().map(|c| c.name.as_str()).collect();
        let extends = found
            .classes
            .iter()
            .filter_map(|class| {
                let parent = class.superclass.as_deref()?;
                class_names.contains(parent).then(|| {
                    Edge::new(
                        class_id(path, &class.name),
                        class_id(path, parent),
                        Relation::Extends,
                    )
                })
            })
            .collect();

        let declared: HashSet<&str> = found.functions.iter().map(|f| f.name.as_str()).collect();
        let call_edges = found
            .calls
            .iter()
            .filter(|site| site.caller != site.callee && declared.contains(site.callee.as_str()))
            .map(|site| {
                Edge::new(
                    function_id(path, &site.caller),
                    function_id(path, &site.callee),
                    Relation::Calls,
                )
            })
            .collect();

        tracing::debug!(
            "Extracted {} ({}): {} imports, {} classes, {} functions",
            path,
            parsed.dialect,
            found.imports.len(),
            found.classes.len(),
            found.functions.len()
        );

        Ok(FilePartial {
            file: file.path.clone(),
            lines_of_code: count_lines(content),
            imports: found.imports,
            classes: found.classes,
            functions: found.functions,
            extends,
            call_edges,
            status: FileStatus::Parsed(parsed.dialect),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(path: &str, code: &str) -> FilePartial {
        EcmaScriptExtractor::default()
            .extract(&FileDescriptor::file(path, code.len() as u64), code)
            .unwrap()
    }

    fn names(functions: &[FunctionInfo]) -> Vec<&str> {
        functions.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_extract_typescript_module() {
        let code = r#"
import { UserService } from './services/user';
import * as utils from './utils';
import './polyfills';

export class UserController {
    private service: UserService;
    #secret = 1;
    static ['computed'] = 2;

    constructor(service: UserService) {
        this.service = service;
    }

    getUser(id: string): User {
        return this.service.findById(id);
    }
}

export function createController(service: UserService): UserController {
    return new UserController(service);
}
"#;
        let partial = extract("src/controller.ts", code);

        assert_eq!(partial.status, FileStatus::Parsed(crate::parser::Dialect::TypeScriptJsx));
        assert_eq!(partial.imports, vec!["./services/user", "./utils", "./polyfills"]);
        assert_eq!(partial.classes.len(), 1);
        let class = &partial.classes[0];
        assert_eq!(class.name, "UserController");
        let members: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(members, vec!["service", "<unknown>", "constructor", "getUser"]);
        assert_eq!(names(&partial.functions), vec!["createController"]);
        assert_eq!(partial.lines_of_code, code.lines().count() as u64 + 1);
    }

    #[test]
    fn test_extract_commonjs_requires() {
        let code = r#"
const fs = require('fs');
const local = require("./local");
const dynamic = require(name);
const twoArgs = require('a', 'b');
const tpl = require(`./tpl`);
"#;
        let partial = extract("index.js", code);
        assert_eq!(partial.imports, vec!["fs", "./local"]);
    }

    #[test]
    fn test_function_bindings() {
        let code = r#"
function declared() {}
function* gen() {}
const arrow = (x) => x ? 1 : 2;
let expr = function named() {};
var notAFunction = 42;
const { destructured } = () => {};
const counter = class {};
"#;
        let partial = extract("f.js", code);
        assert_eq!(names(&partial.functions), vec!["declared", "gen", "arrow", "expr"]);
        assert_eq!(partial.functions[2].complexity, 2);
    }

    #[test]
    fn test_nested_functions_are_collected() {
        let code = "function outer() { function inner() {} return inner(); }";
        let partial = extract("n.js", code);
        assert_eq!(names(&partial.functions), vec!["outer", "inner"]);
        assert_eq!(
            partial.call_edges,
            vec![Edge::new("n.js::fn::outer", "n.js::fn::inner", Relation::Calls)]
        );
    }

    #[test]
    fn test_anonymous_default_exports() {
        let class = extract("c.js", "export default class { render() {} }");
        assert_eq!(class.classes[0].name, ANONYMOUS);
        assert_eq!(class.classes[0].methods, vec![MethodInfo { name: "render".into() }]);

        let function = extract("f.js", "export default function () { if (a) {} }");
        assert_eq!(names(&function.functions), vec![ANONYMOUS]);
        assert_eq!(function.functions[0].complexity, 2);

        let expression = extract("e.js", "const Widget = class {};");
        assert!(expression.classes.is_empty());
    }

    #[test]
    fn test_extends_edges_same_file_only() {
        let code = r#"
class B extends A {}
class A {}
class C extends Remote {}
class D extends mixin(A) {}
"#;
        let partial = extract("k.js", code);
        assert_eq!(
            partial.extends,
            vec![Edge::new("k.js::class::B", "k.js::class::A", Relation::Extends)]
        );
        assert_eq!(partial.classes[2].superclass.as_deref(), Some("Remote"));
        assert_eq!(partial.classes[3].superclass, None);
    }

    #[test]
    fn test_typescript_extends_clause() {
        let code = r#"
abstract class Base<T> { abstract run(): T; }
class Impl extends Base<string> implements Runner { run() { return ""; } }
"#;
        let partial = extract("k.ts", code);
        assert_eq!(
            partial.extends,
            vec![Edge::new("k.ts::class::Impl", "k.ts::class::Base", Relation::Extends)]
        );
    }

    #[test]
    fn test_call_edges() {
        let code = r#"
function g(n) { if (n > 0) { g(n - 1); } h(); }
function h() { [1, 2].forEach(() => g(0)); unknown(); }
class K { m() { h(); } }
h();
"#;
        let partial = extract("s.js", code);
        assert_eq!(
            partial.call_edges,
            vec![
                Edge::new("s.js::fn::g", "s.js::fn::h", Relation::Calls),
                Edge::new("s.js::fn::h", "s.js::fn::g", Relation::Calls),
            ]
        );
    }

    #[test]
    fn test_calls_inside_bound_arrow_use_binding_name() {
        let code = "const run = () => { step(); };\nfunction step() {}\n";
        let partial = extract("r.js", code);
        assert_eq!(
            partial.call_edges,
            vec![Edge::new("r.js::fn::run", "r.js::fn::step", Relation::Calls)]
        );
    }

    #[test]
    fn test_unparsable_source_is_an_error() {
        let result = EcmaScriptExtractor::default()
            .extract(&FileDescriptor::file("bad.js", 10), "function (( {");
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }
}

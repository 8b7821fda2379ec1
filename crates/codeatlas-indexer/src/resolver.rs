//! Import specifier resolution against the analyzed file set

use codeatlas_core::{PathTable, normalize_path};

/// Suffixes probed, in order, after the joined relative path.
pub const PROBE_SUFFIXES: [&str; 7] = ["", ".js", ".jsx", ".ts", ".tsx", "/index.js", "/index.ts"];
/// Suffixes probed for a specifier written with a trailing `/`.
pub const DIRECTORY_SUFFIXES: [&str; 2] = ["/index.js", "/index.ts"];

/// Where an import specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Path of a file in the analyzed tree.
    Local(String),
    /// Specifier left as written.
    External(String),
}

impl Resolution {
    /// The node id an import edge should target.
    pub fn target(&self) -> &str {
        match self {
            Resolution::Local(path) | Resolution::External(path) => path,
        }
    }
}

/// Resolve `specifier` as written in `importer`.
///
/// Specifiers not starting with `.` are package references and returned
/// verbatim. Relative ones are joined with the importer's directory,
/// normalized, and probed with [`PROBE_SUFFIXES`]; the first path present in
/// `paths` wins. A trailing `/` names a directory, so only
/// [`DIRECTORY_SUFFIXES`] are tried.
pub fn resolve_import(specifier: &str, importer: &str, paths: &PathTable) -> Resolution {
    if !specifier.starts_with('.') {
        return Resolution::External(specifier.to_string());
    }

    let dir = importer.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let joined = normalize_path(&format!("{dir}/{specifier}"));

    let suffixes: &[&str] = if specifier.ends_with('/') {
        &DIRECTORY_SUFFIXES
    } else {
        &PROBE_SUFFIXES
    };

    suffixes
        .iter()
        .map(|suffix| format!("{joined}{suffix}").trim_start_matches('/').to_string())
        .find(|candidate| paths.contains(candidate))
        .map(Resolution::Local)
        .unwrap_or_else(|| {
            tracing::trace!("Import {} from {} not found locally", specifier, importer);
            Resolution::External(specifier.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(paths: &[&str]) -> PathTable {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_bare_specifiers_are_external() {
        let paths = table(&["react.js"]);
        assert_eq!(
            resolve_import("react", "src/a.js", &paths),
            Resolution::External("react".into())
        );
        assert_eq!(
            resolve_import("@scope/pkg/sub", "a.js", &paths),
            Resolution::External("@scope/pkg/sub".into())
        );
    }

    #[test]
    fn test_suffix_order() {
        let paths = table(&["src/util.ts", "src/util.js", "src/lib/index.ts", "src/lib.tsx"]);
        assert_eq!(
            resolve_import("./util", "src/a.js", &paths),
            Resolution::Local("src/util.js".into())
        );
        assert_eq!(
            resolve_import("./lib", "src/a.js", &paths),
            Resolution::Local("src/lib.tsx".into())
        );
    }

    #[test]
    fn test_trailing_slash_only_tries_index_files() {
        let paths = table(&["src/a.js", "src/lib.js", "src/lib/index.js", "index.ts"]);
        assert_eq!(
            resolve_import("./lib/", "src/a.js", &paths),
            Resolution::Local("src/lib/index.js".into())
        );
        assert_eq!(
            resolve_import("./lib", "src/a.js", &paths),
            Resolution::Local("src/lib.js".into())
        );
        assert_eq!(resolve_import("./", "a.js", &paths), Resolution::Local("index.ts".into()));

        let siblings_only = table(&["src/a.js", "src/lib.js"]);
        assert_eq!(
            resolve_import("./lib/", "src/a.js", &siblings_only),
            Resolution::External("./lib/".into())
        );
    }

    #[test]
    fn test_index_files_and_parent_dirs() {
        let paths = table(&["components/index.js", "b.js"]);
        assert_eq!(
            resolve_import("../components", "src/app/main.js", &paths),
            Resolution::External("../components".into())
        );
        assert_eq!(
            resolve_import("../../components", "src/app/main.js", &paths),
            Resolution::Local("components/index.js".into())
        );
        assert_eq!(
            resolve_import("./b.js", "a.js", &paths),
            Resolution::Local("b.js".into())
        );
    }

    #[test]
    fn test_unresolved_relative_keeps_specifier() {
        let paths = table(&["a.js"]);
        let resolved = resolve_import("./missing", "a.js", &paths);
        assert_eq!(resolved, Resolution::External("./missing".into()));
        assert_eq!(resolved.target(), "./missing");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let paths = table(&["src/a.js", "src/b.ts"]);
        for spec in ["./b", "../src/b.ts", "lodash", "./nope"] {
            let first = resolve_import(spec, "src/a.js", &paths);
            let second = resolve_import(spec, "src/a.js", &paths);
            assert_eq!(first, second);
            if let Resolution::Local(path) = &first {
                assert_eq!(
                    resolve_import(&format!("./{}", path), "", &paths),
                    Resolution::Local(path.clone())
                );
            }
        }
    }
}

//! Language extractors

pub mod ecmascript;

use crate::extractor::LanguageExtractor;
use codeatlas_core::{ComplexityScope, FileDescriptor};

/// Get the extractor for a file, or `None` when its extension is outside
/// the parseable source family.
pub fn get_extractor(file: &FileDescriptor, scope: ComplexityScope) -> Option<Box<dyn LanguageExtractor>> {
    match file.extension().as_str() {
        "js" | "jsx" | "ts" | "tsx" => Some(Box::new(ecmascript::EcmaScriptExtractor::new(scope))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_lookup_follows_source_membership() {
        for name in ["a.js", "b.JSX", "c.ts", "d.tsx", "e.json", "f.mjs", "README"] {
            let file = FileDescriptor::file(name, 0);
            assert_eq!(
                get_extractor(&file, ComplexityScope::Inclusive).is_some(),
                file.is_source_member(),
                "{name}"
            );
        }
    }
}

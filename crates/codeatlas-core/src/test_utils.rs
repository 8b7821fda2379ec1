//! Test utilities for CodeAtlas

use crate::model::{FileDescriptor, FileTree, Node};

/// A small tree with nested folders and mixed file types.
pub fn sample_tree() -> FileTree {
    FileTree::new(vec![
        FileDescriptor::file("README.md", 1200),
        FileDescriptor::folder(
            "src",
            vec![
                FileDescriptor::file("src/index.ts", 300),
                FileDescriptor::folder(
                    "src/utils",
                    vec![
                        FileDescriptor::file("src/utils/format.js", 120),
                        FileDescriptor::folder(
                            "src/utils/deep",
                            vec![FileDescriptor::file("src/utils/deep/x.js", 10)],
                        ),
                    ],
                ),
                FileDescriptor::file("src/App.jsx", 800),
            ],
        ),
        FileDescriptor::file("package.json", 400),
    ])
}

/// File node with the given complexity already rolled up.
pub fn file_node(path: &str, loc: u64, complexity: u32) -> Node {
    let mut node = Node::file(path, path.rsplit('/').next().unwrap_or(path), loc);
    node.complexity = complexity;
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::flatten;

    #[test]
    fn test_sample_tree_shape() {
        let flat = flatten(&sample_tree(), None);
        assert_eq!(flat.len(), 6);
        assert!(flat.get("src/utils/deep/x.js").is_some());
    }
}

//! Flattening of a hierarchical file tree into an ordered file list

use crate::model::{EntryKind, FileDescriptor, FileTree};
use path_clean::PathClean;
use std::collections::HashMap;
use std::path::Path;

/// Lookup from normalized path to the position of its descriptor in a [`FlatTree`].
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    index: HashMap<String, usize>,
}

impl PathTable {
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Register a path; the first registration of a path wins.
    pub fn insert(&mut self, path: String, position: usize) {
        self.index.entry(path).or_insert(position);
    }
}

impl FromIterator<String> for PathTable {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut table = PathTable::default();
        for (position, path) in iter.into_iter().enumerate() {
            table.insert(path, position);
        }
        table
    }
}

/// Files of a tree in depth-first order, folders elided.
#[derive(Debug, Clone, Default)]
pub struct FlatTree {
    pub files: Vec<FileDescriptor>,
    pub paths: PathTable,
}

impl FlatTree {
    pub fn get(&self, path: &str) -> Option<&FileDescriptor> {
        self.paths.position(path).map(|i| &self.files[i])
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Normalize a tree path: forward slashes, no leading `./` or `/`, `.`/`..` folded.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_start_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    let cleaned = Path::new(trimmed).clean();
    let cleaned = cleaned.to_string_lossy().replace('\\', "/");
    if cleaned == "." {
        String::new()
    } else {
        cleaned
    }
}

/// Build a nested tree from flat `(path, size)` pairs, folders created on first use.
pub fn build_tree<I>(files: I) -> FileTree
where
    I: IntoIterator<Item = (String, u64)>,
{
    fn insert(entries: &mut Vec<FileDescriptor>, prefix: &str, parts: &[&str], size: u64) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };
        let path = if prefix.is_empty() {
            first.to_string()
        } else {
            format!("{prefix}/{first}")
        };
        if rest.is_empty() {
            entries.push(FileDescriptor::file(path, size));
            return;
        }
        let idx = match entries
            .iter()
            .position(|e| e.kind == EntryKind::Folder && e.path == path)
        {
            Some(idx) => idx,
            None => {
                entries.push(FileDescriptor::folder(path.clone(), Vec::new()));
                entries.len() - 1
            }
        };
        insert(&mut entries[idx].children, &path, rest, size);
    }

    let mut entries = Vec::new();
    for (path, size) in files {
        let path = normalize_path(&path);
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        insert(&mut entries, "", &parts, size);
    }
    FileTree::new(entries)
}

/// Flatten `tree` depth-first, children in the order given.
///
/// Folders nested deeper than `max_depth` (root entries sit at depth 0) are not
/// descended into.
pub fn flatten(tree: &FileTree, max_depth: Option<usize>) -> FlatTree {
    fn walk(
        items: &[FileDescriptor],
        depth: usize,
        max_depth: Option<usize>,
        out: &mut FlatTree,
    ) {
        for item in items {
            match item.kind {
                EntryKind::File => {
                    let path = normalize_path(&item.path);
                    out.paths.insert(path.clone(), out.files.len());
                    out.files.push(FileDescriptor {
                        path,
                        children: Vec::new(),
                        ..item.clone()
                    });
                }
                EntryKind::Folder => {
                    if max_depth.is_some_and(|max| depth >= max) {
                        tracing::debug!("Skipping folder beyond depth limit: {}", item.path);
                        continue;
                    }
                    walk(&item.children, depth + 1, max_depth, out);
                }
            }
        }
    }

    let mut out = FlatTree::default();
    walk(&tree.entries, 0, max_depth, &mut out);
    out
}

//! Local directory ingestion

use anyhow::{Context, Result};
use codeatlas_core::{FileTree, build_tree};
use ignore::WalkBuilder;
use std::path::Path;

/// Build a [`FileTree`] from a directory on disk.
///
/// Honors `.gitignore` and skips hidden entries. `max_depth` counts folders
/// the same way [`codeatlas_core::flatten`] does: files directly under `root`
/// sit at depth 0.
pub fn scan_directory(root: &Path, max_depth: Option<usize>) -> Result<FileTree> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .max_depth(max_depth.map(|depth| depth + 1));

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} escaped the scan root", entry.path().display()))?;
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        files.push((relative.to_string_lossy().replace('\\', "/"), size));
    }
    files.sort();

    tracing::debug!("Scanned {} files under {}", files.len(), root.display());
    Ok(build_tree(files))
}

//! On-demand directory view over a flat archive entry list.
//!
//! Hierarchy is a derived view, never a stored structure: this module is a
//! pure function from (entry list, base path) to the direct children of that
//! base, recomputed per request. The entry list itself is cached upstream;
//! the computed view is not.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::zip::ArchiveEntry;

use super::path::SanitizedPath;

/// What a listed node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An archive file itself, as shown at the workspace root.
    Root,
    /// A directory inside an archive, explicit or synthesized.
    Directory,
    /// A file entry inside an archive.
    File,
}

/// One item returned by a listing operation. Computed, not stored.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Last path segment, or the archive's display name for `Root`.
    pub name: String,
    pub kind: NodeKind,
    /// Filesystem path of the archive that owns this node.
    pub archive: PathBuf,
    /// Archive-relative path; empty for `Root`.
    pub internal_path: String,
}

impl TreeNode {
    pub fn root(archive: &Path) -> Self {
        let name = archive
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| archive.display().to_string());
        TreeNode {
            name,
            kind: NodeKind::Root,
            archive: archive.to_path_buf(),
            internal_path: String::new(),
        }
    }
}

/// Compute the direct children of `base` within one archive's entries.
///
/// Intermediate directories that exist only as prefixes of deeper file paths
/// are synthesized; an explicit directory entry and a synthesized one with
/// the same name collapse to a single node. Output is directories first,
/// then files, each group sorted by name (case-sensitive).
pub fn list_children(
    entries: &[ArchiveEntry],
    archive: &Path,
    base: &SanitizedPath,
) -> Vec<TreeNode> {
    let prefix = if base.is_root() {
        String::new()
    } else {
        format!("{}/", base.as_str())
    };

    // BTreeSet gives the sorted-by-name order for free.
    let mut directories: BTreeSet<String> = BTreeSet::new();
    let mut files: BTreeSet<String> = BTreeSet::new();

    for entry in entries {
        let Some(remainder) = entry.path.strip_prefix(&prefix) else {
            continue;
        };
        // Directory-style paths carry a trailing separator; drop the empty
        // final segment it would produce.
        let remainder = remainder.strip_suffix('/').unwrap_or(remainder);
        if remainder.is_empty() {
            continue;
        }

        match remainder.split_once('/') {
            // Deeper path: only the first segment matters, and it is a
            // directory here whether or not it has an entry of its own.
            Some((first, _)) => {
                directories.insert(first.to_string());
            }
            None => {
                if entry.is_directory {
                    directories.insert(remainder.to_string());
                } else {
                    files.insert(remainder.to_string());
                }
            }
        }
    }

    let mut nodes = Vec::with_capacity(directories.len() + files.len());
    for name in directories {
        nodes.push(TreeNode {
            internal_path: format!("{prefix}{name}"),
            kind: NodeKind::Directory,
            archive: archive.to_path_buf(),
            name,
        });
    }
    for name in files {
        nodes.push(TreeNode {
            internal_path: format!("{prefix}{name}"),
            kind: NodeKind::File,
            archive: archive.to_path_buf(),
            name,
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::path::sanitize;
    use crate::zip::CompressionMethod;

    fn entry(path: &str) -> ArchiveEntry {
        ArchiveEntry {
            path: path.to_string(),
            is_directory: path.ends_with('/'),
            method: CompressionMethod::Stored,
            compressed_size: 0,
            uncompressed_size: 0,
            crc32: 0,
            header_offset: 0,
        }
    }

    fn fixture() -> Vec<ArchiveEntry> {
        vec![
            entry("a/"),
            entry("a/b.txt"),
            entry("a/c/d.txt"),
            entry("e.txt"),
        ]
    }

    #[test]
    fn root_lists_top_level_only() {
        let archive = Path::new("/ws/demo.zip");
        let nodes = list_children(&fixture(), archive, &SanitizedPath::root());

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "a");
        assert_eq!(nodes[0].kind, NodeKind::Directory);
        assert_eq!(nodes[0].internal_path, "a");
        assert_eq!(nodes[1].name, "e.txt");
        assert_eq!(nodes[1].kind, NodeKind::File);
        assert_eq!(nodes[1].archive, archive);
    }

    #[test]
    fn nested_listing_synthesizes_directories() {
        let nodes = list_children(
            &fixture(),
            Path::new("/ws/demo.zip"),
            &sanitize("a").unwrap(),
        );

        // `c` has no explicit entry; it exists only as a prefix of
        // `a/c/d.txt`. Directories sort before files.
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "c");
        assert_eq!(nodes[0].kind, NodeKind::Directory);
        assert_eq!(nodes[0].internal_path, "a/c");
        assert_eq!(nodes[1].name, "b.txt");
        assert_eq!(nodes[1].kind, NodeKind::File);
        assert_eq!(nodes[1].internal_path, "a/b.txt");
    }

    #[test]
    fn explicit_and_synthesized_directories_deduplicate() {
        let entries = vec![entry("dir/"), entry("dir/inner.txt"), entry("dir/deep/x")];
        let nodes = list_children(&entries, Path::new("/a.zip"), &SanitizedPath::root());

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "dir");
        assert_eq!(nodes[0].kind, NodeKind::Directory);
    }

    #[test]
    fn directories_sort_before_files_within_name_order() {
        let entries = vec![
            entry("zebra.txt"),
            entry("alpha.txt"),
            entry("mid/f"),
            entry("aa/g"),
        ];
        let nodes = list_children(&entries, Path::new("/a.zip"), &SanitizedPath::root());

        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["aa", "mid", "alpha.txt", "zebra.txt"]);
    }

    #[test]
    fn listing_a_file_path_yields_nothing() {
        let nodes = list_children(
            &fixture(),
            Path::new("/a.zip"),
            &sanitize("e.txt").unwrap(),
        );
        assert!(nodes.is_empty());
    }

    #[test]
    fn empty_archive_lists_empty() {
        let nodes = list_children(&[], Path::new("/a.zip"), &SanitizedPath::root());
        assert!(nodes.is_empty());
    }
}

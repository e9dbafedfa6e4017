//! Virtual-filesystem view over archive contents: path hygiene and the
//! on-demand directory tree.

pub mod path;
pub mod tree;

pub use path::{SanitizedPath, sanitize};
pub use tree::{NodeKind, TreeNode, list_children};

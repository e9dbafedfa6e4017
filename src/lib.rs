//! # ziplens
//!
//! Browse and safely preview the contents of zip archives without extracting
//! them to disk.
//!
//! An archive's flat entry list is indexed once and viewed as a directory
//! tree computed on demand. Parsed archives and decoded previews are cached
//! under explicit lifecycle control, and every byte handed out passes a
//! path sanitizer and a size/compression-ratio gate first, so traversal
//! attempts and zip bombs are rejected before any data is decoded.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use ziplens::{ArchiveBrowser, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let browser = ArchiveBrowser::new("workspace".into(), Settings::default());
//!
//!     for node in browser.children(Path::new("workspace/data.zip"), None).await? {
//!         println!("{}", node.name);
//!     }
//!
//!     let text = browser.resolve_preview("workspace/data.zip!/readme.txt").await;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod safety;
pub mod vfs;
pub mod watch;
pub mod zip;

pub use browser::{ArchiveBrowser, ChangeEvent};
pub use cache::{ArchiveCache, ContentCache, PreviewKey, PreviewMode};
pub use cli::{Cli, Command};
pub use config::Settings;
pub use error::ExtractError;
pub use extract::Extractor;
pub use safety::ExtractLimits;
pub use vfs::{NodeKind, SanitizedPath, TreeNode};
pub use watch::ArchiveWatcher;
pub use zip::{ArchiveEntry, ArchiveIndex, CompressionMethod};

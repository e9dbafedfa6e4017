//! The long-lived browsing service and its external boundaries.
//!
//! [`ArchiveBrowser`] owns the caches and settings, and exposes the four
//! surfaces the host calls: root/directory listing, text preview by virtual
//! document identity, raw byte extraction, and change-notification intake.
//! Failures never cross the preview boundary as errors; they come back as
//! the user-facing message strings.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cache::{ArchiveCache, ContentCache};
use crate::config::Settings;
use crate::error::ExtractError;
use crate::extract::Extractor;
use crate::safety::ExtractLimits;
use crate::vfs::{self, SanitizedPath, TreeNode};

/// Filesystem extension of the archives this service browses.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Separator between archive path and internal path in a virtual document
/// identity, e.g. `docs.zip!/guide/intro.md`.
const IDENTITY_SEPARATOR: &str = "!/";

/// A change notification for an archive file, delivered by the watching
/// collaborator.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl ChangeEvent {
    pub fn path(&self) -> &Path {
        match self {
            ChangeEvent::Created(path)
            | ChangeEvent::Modified(path)
            | ChangeEvent::Deleted(path) => path,
        }
    }
}

pub struct ArchiveBrowser {
    workspace: PathBuf,
    settings: Mutex<Settings>,
    archives: Arc<ArchiveCache>,
    previews: Arc<ContentCache>,
    extractor: Extractor,
    rescan_needed: AtomicBool,
}

impl ArchiveBrowser {
    pub fn new(workspace: PathBuf, settings: Settings) -> Self {
        let archives = Arc::new(ArchiveCache::new());
        let previews = Arc::new(ContentCache::new());
        let extractor = Extractor::new(Arc::clone(&archives), Arc::clone(&previews));
        Self {
            workspace,
            settings: Mutex::new(settings),
            archives,
            previews,
            extractor,
            rescan_needed: AtomicBool::new(false),
        }
    }

    /// Swap in new settings; they apply from the next call onwards.
    pub fn update_settings(&self, settings: Settings) {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Limits for one extraction decision, read fresh from settings.
    fn limits(&self) -> ExtractLimits {
        let settings = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        ExtractLimits {
            max_bytes: settings.max_file_bytes(),
            max_ratio: settings.max_compression_ratio(),
        }
    }

    fn preview_capacity(&self) -> usize {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .max_cached_previews()
    }

    /// Root-level listing: one node per archive discovered under the
    /// workspace, sorted by path.
    pub fn roots(&self) -> Vec<TreeNode> {
        self.rescan_needed.store(false, Ordering::Relaxed);

        let mut archives: Vec<PathBuf> = WalkDir::new(&self.workspace)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
            })
            .collect();
        archives.sort();

        archives.iter().map(|path| TreeNode::root(path)).collect()
    }

    /// Workspace-relative location string for display next to a root node.
    pub fn location_of(&self, archive: &Path) -> String {
        archive
            .strip_prefix(&self.workspace)
            .unwrap_or(archive)
            .display()
            .to_string()
    }

    /// Direct children of a directory inside an archive. An empty or
    /// missing internal path lists the archive's top level.
    pub async fn children(
        &self,
        archive: &Path,
        internal_path: Option<&str>,
    ) -> Result<Vec<TreeNode>, ExtractError> {
        let base = match internal_path {
            None | Some("") => SanitizedPath::root(),
            Some(raw) => vfs::sanitize(raw).ok_or(ExtractError::InvalidPath)?,
        };

        let index = self.archives.get_or_load(archive).await?;
        Ok(vfs::list_children(index.entries(), archive, &base))
    }

    /// Binary-extraction boundary: raw validated bytes for viewer callers.
    pub async fn read_bytes(
        &self,
        archive: &Path,
        internal_path: &str,
    ) -> Result<Vec<u8>, ExtractError> {
        self.extractor
            .extract(archive, internal_path, &self.limits())
            .await
    }

    /// Text preview with typed failures, for callers that want to branch on
    /// the kind rather than show a message.
    pub async fn preview(
        &self,
        archive: &Path,
        internal_path: &str,
    ) -> Result<String, ExtractError> {
        self.extractor
            .preview_text(
                archive,
                internal_path,
                &self.limits(),
                self.preview_capacity(),
            )
            .await
    }

    /// Content-preview boundary: resolve a virtual document identity of the
    /// form `<archive path>!/<internal path>` to decoded text, or to a
    /// user-facing error string. Never returns an error and never panics.
    pub async fn resolve_preview(&self, identity: &str) -> String {
        let Some((archive, internal_path)) = identity.split_once(IDENTITY_SEPARATOR) else {
            return "Missing zip file path".to_string();
        };
        if archive.is_empty() {
            return "Missing zip file path".to_string();
        }

        match self.preview(Path::new(archive), internal_path).await {
            Ok(text) => text,
            Err(err) => {
                warn!(identity, error = %err, "preview failed");
                err.user_message()
            }
        }
    }

    /// Change-notification boundary. Invalidation completes synchronously
    /// before this returns, so no later read can observe stale parsed data.
    /// Created/deleted archives additionally flag the root listing for a
    /// re-scan.
    pub fn handle_event(&self, event: &ChangeEvent) {
        let path = event.path();
        self.archives.invalidate(path);
        self.previews.invalidate_archive(path);

        match event {
            ChangeEvent::Created(_) | ChangeEvent::Deleted(_) => {
                self.rescan_needed.store(true, Ordering::Relaxed);
            }
            ChangeEvent::Modified(_) => {}
        }
        info!(archive = %path.display(), event = ?event, "archive change handled");
    }

    /// Whether a create/delete since the last root listing calls for a
    /// re-scan of discoverable archives.
    pub fn rescan_needed(&self) -> bool {
        self.rescan_needed.load(Ordering::Relaxed)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Teardown: release every cached index and preview.
    pub fn shutdown(&self) {
        self.archives.clear();
        self.previews.clear();
        info!("archive browser shut down, caches cleared");
    }
}

//! Validation of archive-internal paths.
//!
//! Every path that arrives from outside the trusted archive index (a preview
//! identity, a CLI argument) goes through [`sanitize`] before it is used to
//! look up or extract anything. A path that fails any rule is rejected whole;
//! there is no partial cleanup of a traversal attempt.

use std::fmt;

/// A slash-normalized, traversal-free archive-relative path.
///
/// Only constructible through [`sanitize`] (or [`SanitizedPath::root`] for
/// the empty base used when listing an archive's top level).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedPath(String);

impl SanitizedPath {
    /// The archive root: the empty base path.
    pub fn root() -> Self {
        SanitizedPath(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SanitizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate and normalize a raw archive-internal path.
///
/// Backslashes become forward slashes, leading slashes are stripped, empty
/// and `.` segments are dropped. Any `..` segment or drive-letter segment
/// (`C:`) rejects the whole path, as does a path that is empty once
/// normalized.
pub fn sanitize(raw: &str) -> Option<SanitizedPath> {
    let normalized = raw.replace('\\', "/");

    let mut segments = Vec::new();
    for segment in normalized.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." || is_drive_letter(segment) {
            return None;
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return None;
    }

    Some(SanitizedPath(segments.join("/")))
}

fn is_drive_letter(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

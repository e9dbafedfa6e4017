//! Process-lifetime cache state: parsed archive indexes and decoded
//! previews. Both are owned by the long-lived browser service and cleared at
//! teardown; neither is ambient global state.

mod archive;
mod content;

pub use archive::ArchiveCache;
pub use content::{ContentCache, PreviewKey, PreviewMode};

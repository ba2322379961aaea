//! Encoding sinks.
//!
//! Sinks consume composited frames in output order. [`sink::SinkGuard`] owns the open/close
//! lifecycle so every successfully opened sink is closed exactly once.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Raw RGBA frame dump sink.
pub mod raw;
/// Generic frame sink trait, the scoped guard, and the in-memory sink.
pub mod sink;

use std::path::Path;

use crate::foundation::error::SlideResult;

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SlideResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

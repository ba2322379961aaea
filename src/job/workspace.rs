use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{SlideError, SlideResult};
use crate::job::job_token;

/// Subdirectory holding rasterized page images.
pub const PAGES_DIR_NAME: &str = "extracted_images";
/// Stem of the in-progress video file.
pub const TEMP_VIDEO_STEM: &str = "temp_output_video";

/// Where a job's working directory lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkDir {
    /// A fresh `job-<token>` directory under this root, distinct for every job.
    Keyed(PathBuf),
    /// This exact directory. Stale pages from an earlier job are cleared on reuse; two
    /// concurrent jobs must not share it.
    Exact(PathBuf),
}

/// Temporary filesystem area owned by one conversion job.
#[derive(Debug)]
pub struct JobWorkspace {
    root: PathBuf,
}

impl JobWorkspace {
    /// Create (or reuse, for [`WorkDir::Exact`]) the working directory.
    pub fn create(dir: &WorkDir) -> SlideResult<Self> {
        let root = match dir {
            WorkDir::Keyed(parent) => parent.join(format!("job-{}", job_token())),
            WorkDir::Exact(path) => path.clone(),
        };
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create working directory '{}'", root.display()))?;
        Ok(Self { root })
    }

    /// Working directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the rasterizer writes page images into.
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR_NAME)
    }

    /// In-progress video path, sharing the extension of `output`.
    pub fn temp_video_for(&self, output: &Path) -> PathBuf {
        let mut path = self.root.join(TEMP_VIDEO_STEM);
        if let Some(ext) = output.extension() {
            path.set_extension(ext);
        }
        path
    }

    /// Make sure the pages directory exists and is empty.
    ///
    /// Returns how many stale entries were removed.
    pub fn prepare_pages_dir(&self) -> SlideResult<usize> {
        let dir = self.pages_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create pages directory '{}'", dir.display()))?;

        let mut removed = 0;
        for entry in
            std::fs::read_dir(&dir).with_context(|| format!("list '{}'", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("list '{}'", dir.display()))?
                .path();
            let removal = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            removal.with_context(|| format!("remove stale page '{}'", path.display()))?;
            removed += 1;
        }
        if removed > 0 {
            tracing::info!(dir = %dir.display(), removed, "cleared stale page images");
        }
        Ok(removed)
    }

    /// Delete the whole working directory.
    pub fn remove(&self) -> SlideResult<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SlideError::cleanup(format!(
                "failed to delete working directory '{}': {e}",
                self.root.display()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/workspace.rs"]
mod tests;

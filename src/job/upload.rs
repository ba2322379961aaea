use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::decode::list_page_images;
use crate::foundation::error::{SlideError, SlideResult};
use crate::job::job_token;

/// Copy `input` into `upload_dir` under a unique name, as an uploaded document would arrive.
///
/// Files are copied as-is. Directories are copied one level deep, page images only.
pub fn stage_upload(input: &Path, upload_dir: &Path) -> SlideResult<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| SlideError::validation(format!("'{}' has no file name", input.display())))?;
    std::fs::create_dir_all(upload_dir)
        .with_context(|| format!("create upload directory '{}'", upload_dir.display()))?;

    let mut staged_name = std::ffi::OsString::from(format!("upload-{}-", job_token()));
    staged_name.push(name);
    let staged = upload_dir.join(staged_name);

    if input.is_dir() {
        std::fs::create_dir_all(&staged)
            .with_context(|| format!("create '{}'", staged.display()))?;
        for page in list_page_images(input)? {
            if let Some(page_name) = page.file_name() {
                std::fs::copy(&page, staged.join(page_name))
                    .with_context(|| format!("stage page '{}'", page.display()))?;
            }
        }
    } else {
        std::fs::copy(input, &staged).with_context(|| {
            format!("stage '{}' into '{}'", input.display(), upload_dir.display())
        })?;
    }
    Ok(staged)
}

/// Removes an uploaded source document when dropped.
///
/// Removal happens once, on every exit path of the job that owns the guard.
#[derive(Debug)]
pub struct SourceGuard(Option<PathBuf>);

impl SourceGuard {
    /// Take ownership of the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    /// Path of the guarded document, until it is removed.
    pub fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        let Some(path) = self.0.take() else {
            return;
        };
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => tracing::debug!(path = %path.display(), "removed source document"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove source document")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/upload.rs"]
mod tests;

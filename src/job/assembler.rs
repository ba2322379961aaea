use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::assets::decode::list_page_images;
use crate::compose::pipeline::{CompositeThreading, composite_pages};
use crate::config::variables::JobVariables;
use crate::encode::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig, SinkGuard};
use crate::foundation::core::{CanvasSpec, Fps, SlideDuration};
use crate::foundation::error::{SlideError, SlideResult};
use crate::job::upload::SourceGuard;
use crate::job::workspace::{JobWorkspace, WorkDir};
use crate::plan::sequence::{FramePlan, plan};
use crate::raster::Rasterizer;

/// Phases of one conversion job.
///
/// `Idle -> Extracting -> Compositing -> Encoding -> Finalizing -> Done`, with a jump to
/// `Failed` from any phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobPhase {
    /// Job accepted; variables are being read.
    Idle,
    /// Rasterizing the document into the pages directory.
    Extracting,
    /// Letterboxing page images.
    Compositing,
    /// Writing planned frames through the sink.
    Encoding,
    /// Checking and moving the temporary video, then deleting the working directory.
    Finalizing,
    /// Output is in place and temporary data is gone.
    Done,
    /// The job failed. The final output location was not updated unless the failure was in
    /// cleanup after the move.
    Failed,
}

impl JobPhase {
    /// Return `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    fn can_enter(self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Idle, Extracting)
                | (Extracting, Compositing)
                | (Compositing, Encoding)
                | (Encoding, Finalizing)
                | (Finalizing, Done)
        ) || (next == Failed && !self.is_terminal())
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Compositing => "compositing",
            Self::Encoding => "encoding",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One document-to-video conversion request.
#[derive(Clone, Debug)]
pub struct ConversionJob {
    /// Uploaded source document. Removed when the job ends, whatever the outcome.
    pub document: PathBuf,
    /// Variables file holding the slide duration.
    pub variables: PathBuf,
    /// Final video location. Overwritten on success, untouched on failure.
    pub output: PathBuf,
    /// Working directory placement.
    pub work_dir: WorkDir,
}

/// Summary of a successful job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobReport {
    /// Final video path.
    pub output: PathBuf,
    /// Number of pages in the video.
    pub pages: usize,
    /// Total frames written to the sink.
    pub frames: u64,
    /// Per-page duration that was applied.
    pub duration: SlideDuration,
}

/// Drives one conversion job through rasterize, composite, plan, encode, and finalize.
///
/// Every phase change is recorded in [`SlideshowAssembler::history`].
pub struct SlideshowAssembler<'r> {
    rasterizer: &'r dyn Rasterizer,
    spec: CanvasSpec,
    threading: CompositeThreading,
    fps: Fps,
    history: Vec<JobPhase>,
    remove_workspace: fn(&JobWorkspace) -> SlideResult<()>,
}

impl<'r> SlideshowAssembler<'r> {
    /// Assembler that rasterizes with `rasterizer` and composites onto `spec`.
    pub fn new(rasterizer: &'r dyn Rasterizer, spec: CanvasSpec) -> Self {
        Self {
            rasterizer,
            spec,
            threading: CompositeThreading::default(),
            fps: Fps::SLIDESHOW,
            history: vec![JobPhase::Idle],
            remove_workspace: JobWorkspace::remove,
        }
    }

    /// Composite pages with the given thread configuration.
    pub fn with_threading(mut self, threading: CompositeThreading) -> Self {
        self.threading = threading;
        self
    }

    /// Current phase.
    pub fn phase(&self) -> JobPhase {
        self.history.last().copied().unwrap_or(JobPhase::Idle)
    }

    /// Phases visited by the most recent job, starting at `Idle`.
    pub fn history(&self) -> &[JobPhase] {
        &self.history
    }

    /// Run `job` to completion, writing frames through `sink`.
    ///
    /// On success the video is at `job.output` and the working directory is gone. On failure
    /// the working directory is removed best-effort and the output location is left alone. A
    /// failure to remove the working directory after a successful move is still an error.
    /// The source document is removed in every case.
    #[tracing::instrument(skip(self, sink), fields(document = %job.document.display()))]
    pub fn run(&mut self, job: &ConversionJob, sink: &mut dyn FrameSink) -> SlideResult<JobReport> {
        self.history = vec![JobPhase::Idle];
        let _source = SourceGuard::new(&job.document);

        if let Err(e) = check_output_outside(job) {
            self.enter(JobPhase::Failed);
            return Err(e);
        }

        let workspace = match JobWorkspace::create(&job.work_dir) {
            Ok(ws) => ws,
            Err(e) => {
                self.enter(JobPhase::Failed);
                return Err(e);
            }
        };

        match self.execute(job, &workspace, sink) {
            Ok(report) => {
                if let Err(e) = (self.remove_workspace)(&workspace) {
                    tracing::error!(error = %e, output = %report.output.display(), "video written but cleanup failed");
                    self.enter(JobPhase::Failed);
                    return Err(e);
                }
                self.enter(JobPhase::Done);
                tracing::info!(
                    output = %report.output.display(),
                    pages = report.pages,
                    frames = report.frames,
                    "slideshow written"
                );
                Ok(report)
            }
            Err(e) => {
                self.enter(JobPhase::Failed);
                if let Err(cleanup) = (self.remove_workspace)(&workspace) {
                    tracing::warn!(error = %cleanup, "best-effort cleanup failed");
                }
                tracing::error!(error = %e, "conversion failed");
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        job: &ConversionJob,
        workspace: &JobWorkspace,
        sink: &mut dyn FrameSink,
    ) -> SlideResult<JobReport> {
        let duration = JobVariables::from_path(&job.variables)?.duration();

        self.enter(JobPhase::Extracting);
        let pages_dir = workspace.pages_dir();
        workspace.prepare_pages_dir()?;
        self.rasterizer.rasterize(&job.document, &pages_dir)?;
        let pages = list_page_images(&pages_dir)?;
        if pages.is_empty() {
            return Err(SlideError::rasterize(format!(
                "'{}' produced no page images",
                job.document.display()
            )));
        }

        self.enter(JobPhase::Compositing);
        let frames = composite_pages(&pages, &self.spec, &self.threading)?;

        self.enter(JobPhase::Encoding);
        let frame_plan = plan(&frames, duration, self.fps);
        let temp_video = workspace.temp_video_for(&job.output);
        let written = self.encode(&frame_plan, &temp_video, sink)?;

        self.enter(JobPhase::Finalizing);
        finalize_output(&temp_video, &job.output)?;

        Ok(JobReport {
            output: job.output.clone(),
            pages: frame_plan.len(),
            frames: written,
            duration,
        })
    }

    fn encode(
        &self,
        frame_plan: &FramePlan<'_, RgbaImage>,
        temp_video: &Path,
        sink: &mut dyn FrameSink,
    ) -> SlideResult<u64> {
        let cfg = SinkConfig {
            out_path: temp_video.to_path_buf(),
            width: self.spec.canvas.width,
            height: self.spec.canvas.height,
            fps: frame_plan.fps(),
        };
        let mut guard = SinkGuard::open(sink, cfg)?;
        for (page, entry) in frame_plan.entries().iter().enumerate() {
            tracing::debug!(page, repeat = entry.repeat, "encoding page");
            guard.write_repeated(entry.item, entry.repeat)?;
        }
        guard.close()
    }

    fn enter(&mut self, next: JobPhase) {
        let current = self.phase();
        debug_assert!(
            current.can_enter(next),
            "invalid job transition {current} -> {next}"
        );
        tracing::info!(from = %current, to = %next, "job phase");
        self.history.push(next);
    }
}

/// Reject an output that would be deleted together with an exact working directory.
fn check_output_outside(job: &ConversionJob) -> SlideResult<()> {
    let WorkDir::Exact(dir) = &job.work_dir else {
        return Ok(());
    };
    let output = std::path::absolute(&job.output)
        .with_context(|| format!("resolve '{}'", job.output.display()))?;
    let dir = std::path::absolute(dir).with_context(|| format!("resolve '{}'", dir.display()))?;
    if output.starts_with(&dir) {
        return Err(SlideError::validation(format!(
            "output '{}' is inside the working directory '{}'",
            job.output.display(),
            dir.display()
        )));
    }
    Ok(())
}

/// Move a finished temporary video over `output`.
///
/// A missing or empty temporary file is an [`SlideError::Encoding`] and leaves `output`
/// untouched.
pub fn finalize_output(temp_video: &Path, output: &Path) -> SlideResult<()> {
    let len = std::fs::metadata(temp_video).map(|m| m.len()).unwrap_or(0);
    if len == 0 {
        return Err(SlideError::encoding(format!(
            "temporary video '{}' is missing or empty",
            temp_video.display()
        )));
    }
    ensure_parent_dir(output)?;
    move_file(temp_video, output)
}

fn move_file(from: &Path, to: &Path) -> SlideResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // Different filesystem: copy next to the target, then rename over it.
    let mut partial = to.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);
    std::fs::copy(from, &partial)
        .with_context(|| format!("copy '{}' to '{}'", from.display(), partial.display()))?;
    if let Err(e) = std::fs::rename(&partial, to) {
        let _ = std::fs::remove_file(&partial);
        return Err(anyhow::Error::new(e)
            .context(format!("replace '{}'", to.display()))
            .into());
    }
    std::fs::remove_file(from).with_context(|| format!("remove '{}'", from.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/job/assembler.rs"]
mod tests;

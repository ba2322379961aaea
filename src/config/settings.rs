use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compose::pipeline::CompositeThreading;
use crate::foundation::color::PadColor;
use crate::foundation::core::{Canvas, CanvasSpec};
use crate::foundation::error::{SlideError, SlideResult};

/// Default location of the finished video.
pub const DEFAULT_OUTPUT: &str = "files/output_video.mp4";
/// Default directory where input documents are staged as uploads.
pub const DEFAULT_UPLOAD_DIR: &str = "files";
/// Default parent of per-job working directories.
pub const DEFAULT_WORK_ROOT: &str = "files/temp";
/// Default rasterization resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 150;

/// Run-wide settings shared by every job of one process.
///
/// Loaded from an optional JSON file; every field has a default. The frame rate is not
/// configurable.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideshowConfig {
    /// Output resolution.
    pub canvas: Canvas,
    /// Letterbox fill color.
    pub pad_color: PadColor,
    /// Final video location.
    pub output: PathBuf,
    /// Directory under which per-job working directories are created.
    pub work_root: PathBuf,
    /// Directory where input documents are staged before a job and removed after it.
    pub upload_dir: PathBuf,
    /// Rasterization DPI for document inputs.
    pub dpi: u32,
    /// Compositing thread configuration.
    pub threading: CompositeThreading,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::FULL_HD,
            pad_color: PadColor::BLACK,
            output: PathBuf::from(DEFAULT_OUTPUT),
            work_root: PathBuf::from(DEFAULT_WORK_ROOT),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            dpi: DEFAULT_DPI,
            threading: CompositeThreading::default(),
        }
    }
}

impl SlideshowConfig {
    /// Load settings from a JSON file and validate them.
    pub fn from_path(path: &Path) -> SlideResult<Self> {
        let f = File::open(path).map_err(|e| {
            SlideError::configuration(format!("open settings '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            SlideError::configuration(format!("parse settings '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> SlideResult<()> {
        self.canvas.validate()?;
        if self.dpi == 0 {
            return Err(SlideError::validation("dpi must be > 0"));
        }
        if self.threading.threads == Some(0) {
            return Err(SlideError::validation("threading.threads must be >= 1 when set"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(SlideError::validation("output path must be non-empty"));
        }
        Ok(())
    }

    /// Canvas and pad color as one spec.
    pub fn canvas_spec(&self) -> CanvasSpec {
        CanvasSpec {
            canvas: self.canvas,
            pad: self.pad_color,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;

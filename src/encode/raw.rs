use std::fs::File;
use std::io::{BufWriter, Write as _};

use image::RgbaImage;

use crate::encode::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{SlideError, SlideResult};

/// Writes frames as tightly packed RGBA8, back to back, with no header.
///
/// The result can be muxed later with
/// `ffmpeg -f rawvideo -pix_fmt rgba -s WxH -r FPS -i FILE ...`.
#[derive(Debug, Default)]
pub struct RawRgbaSink {
    out: Option<BufWriter<File>>,
    cfg: Option<SinkConfig>,
}

impl RawRgbaSink {
    /// Create a closed sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for RawRgbaSink {
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()> {
        if self.out.is_some() {
            return Err(SlideError::encoding("raw sink is already open"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SlideError::validation(
                "raw sink width/height must be non-zero",
            ));
        }
        ensure_parent_dir(&cfg.out_path)?;
        let file = File::create(&cfg.out_path).map_err(|e| {
            SlideError::encoding(format!(
                "create raw video '{}': {e}",
                cfg.out_path.display()
            ))
        })?;
        self.out = Some(BufWriter::new(file));
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> SlideResult<()> {
        let (Some(cfg), Some(out)) = (self.cfg.as_ref(), self.out.as_mut()) else {
            return Err(SlideError::encoding("raw sink not started"));
        };
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(SlideError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        out.write_all(frame.as_raw())
            .map_err(|e| SlideError::encoding(format!("write raw frame: {e}")))
    }

    fn end(&mut self) -> SlideResult<()> {
        self.cfg = None;
        let mut out = self
            .out
            .take()
            .ok_or_else(|| SlideError::encoding("raw sink not started"))?;
        out.flush()
            .map_err(|e| SlideError::encoding(format!("flush raw video: {e}")))?;
        out.get_ref()
            .sync_all()
            .map_err(|e| SlideError::encoding(format!("sync raw video: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raw.rs"]
mod tests;

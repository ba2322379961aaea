use std::path::PathBuf;

use image::RgbaImage;

use crate::foundation::core::Fps;
use crate::foundation::error::{SlideError, SlideResult};

/// Configuration handed to a [`FrameSink`] when it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// File the sink writes to.
    pub out_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: Fps,
}

/// Encoder contract: open once, push frames in output order, close once.
///
/// Prefer driving a sink through [`SinkGuard`], which guarantees `end` runs on every exit
/// path after a successful `begin`.
pub trait FrameSink: Send {
    /// Open the sink. Called once before any frame is pushed.
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()>;
    /// Push the next output frame.
    fn push_frame(&mut self, frame: &RgbaImage) -> SlideResult<()>;
    /// Close the sink and release its resources. Called once after a successful `begin`.
    fn end(&mut self) -> SlideResult<()>;
}

/// Scoped owner of an opened [`FrameSink`].
///
/// `end` runs exactly once: explicitly through [`SinkGuard::close`], or from `Drop` when the
/// guard goes out of scope early (error, `?`, panic). Errors from the drop path are logged.
pub struct SinkGuard<'a> {
    sink: &'a mut dyn FrameSink,
    open: bool,
    frames: u64,
}

impl<'a> SinkGuard<'a> {
    /// Open `sink` with `cfg`. A failed `begin` leaves nothing to close.
    pub fn open(sink: &'a mut dyn FrameSink, cfg: SinkConfig) -> SlideResult<Self> {
        sink.begin(cfg)?;
        Ok(Self {
            sink,
            open: true,
            frames: 0,
        })
    }

    /// Push one frame.
    pub fn write_frame(&mut self, frame: &RgbaImage) -> SlideResult<()> {
        if !self.open {
            return Err(SlideError::encoding("sink is already closed"));
        }
        self.sink.push_frame(frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Push `frame` `count` times in a row.
    pub fn write_repeated(&mut self, frame: &RgbaImage, count: u64) -> SlideResult<()> {
        for _ in 0..count {
            self.write_frame(frame)?;
        }
        Ok(())
    }

    /// Frames pushed so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Close the sink and return the number of frames written.
    pub fn close(mut self) -> SlideResult<u64> {
        self.open = false;
        self.sink.end()?;
        Ok(self.frames)
    }
}

impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.sink.end() {
            tracing::warn!(error = %e, frames = self.frames, "closing sink after failure");
        }
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<RgbaImage>,
    begin_calls: u32,
    end_calls: u32,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    /// How many times `begin` ran.
    pub fn begin_calls(&self) -> u32 {
        self.begin_calls
    }

    /// How many times `end` ran.
    pub fn end_calls(&self) -> u32 {
        self.end_calls
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()> {
        self.begin_calls += 1;
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage) -> SlideResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> SlideResult<()> {
        self.end_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

use crate::foundation::color::PadColor;
use crate::foundation::error::{SlideError, SlideResult};

/// Absolute 0-based frame index in output video space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Integer output frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps(u32);

impl Fps {
    /// The fixed slideshow frame rate.
    pub const SLIDESHOW: Fps = Fps(30);

    /// Create a validated frame rate.
    pub fn new(fps: u32) -> SlideResult<Self> {
        if fps == 0 {
            return Err(SlideError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Frames per second.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of frames covering `duration`.
    pub fn frames_for(self, duration: SlideDuration) -> u64 {
        u64::from(self.0) * u64::from(duration.secs())
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self::SLIDESHOW
    }
}

/// How long each slide stays on screen, in whole seconds.
///
/// Always positive. Use [`SlideDuration::DEFAULT`] when configuration is absent or unusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlideDuration(u32);

impl SlideDuration {
    /// Fallback duration in seconds.
    pub const DEFAULT: SlideDuration = SlideDuration(5);

    /// Return `None` for a zero duration.
    pub fn new(secs: u32) -> Option<Self> {
        (secs > 0).then_some(Self(secs))
    }

    /// Duration in seconds.
    pub fn secs(self) -> u32 {
        self.0
    }
}

impl Default for SlideDuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Full HD, the default slideshow resolution.
    pub const FULL_HD: Canvas = Canvas {
        width: 1920,
        height: 1080,
    };

    /// Create a validated canvas with both dimensions non-zero.
    pub fn new(width: u32, height: u32) -> SlideResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Check that both dimensions are non-zero.
    pub fn validate(self) -> SlideResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlideError::validation(format!(
                "canvas width/height must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Bytes in one tightly packed RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::FULL_HD
    }
}

/// Target canvas plus the color used for letterbox padding. Constant for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanvasSpec {
    /// Output dimensions.
    pub canvas: Canvas,
    /// Letterbox fill.
    pub pad: PadColor,
}

impl CanvasSpec {
    /// Create a validated canvas spec.
    pub fn new(width: u32, height: u32, pad: PadColor) -> SlideResult<Self> {
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            pad,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

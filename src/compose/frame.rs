use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::assets::decode::{PageImage, ensure_non_degenerate, load_page};
use crate::foundation::core::{Canvas, CanvasSpec};
use crate::foundation::error::SlideResult;

/// Scaling filter used for page resizes (bilinear).
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Pad widths around the resized page, in pixels.
///
/// Top/bottom split one vertical total and left/right split one horizontal total. Any odd
/// leftover pixel goes to bottom/right. A margin is 0 on an axis where the resized page
/// overflows the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    /// Rows above the page.
    pub top: u32,
    /// Rows below the page.
    pub bottom: u32,
    /// Columns left of the page.
    pub left: u32,
    /// Columns right of the page.
    pub right: u32,
}

impl Margins {
    /// Margins for a `resized_width x resized_height` page on `canvas`.
    pub fn compute(resized_width: u32, resized_height: u32, canvas: Canvas) -> Self {
        let (top, bottom) = split_delta(canvas.height, resized_height);
        let (left, right) = split_delta(canvas.width, resized_width);
        Self {
            top,
            bottom,
            left,
            right,
        }
    }
}

fn split_delta(target: u32, resized: u32) -> (u32, u32) {
    let delta = i64::from(target) - i64::from(resized);
    let lead = delta.div_euclid(2).max(0);
    let trail = (delta - lead).max(0);
    (lead as u32, trail as u32)
}

/// Where a source page lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterboxLayout {
    /// Page width after resize.
    pub resized_width: u32,
    /// Page height after resize.
    pub resized_height: u32,
    /// Padding around the resized page.
    pub margins: Margins,
}

impl LetterboxLayout {
    /// Layout for a `src_width x src_height` source on `canvas`.
    pub fn compute(src_width: u32, src_height: u32, canvas: Canvas) -> Self {
        let (resized_width, resized_height) = fit_size(src_width, src_height, canvas);
        Self {
            resized_width,
            resized_height,
            margins: Margins::compute(resized_width, resized_height, canvas),
        }
    }
}

/// Resize target for a source, fitting its longer side to the canvas.
///
/// Landscape sources (`width > height`) take the canvas width. Everything else takes the
/// canvas height. The other axis keeps the source aspect ratio, rounded half-to-even and
/// clamped to at least 1 pixel. It is not clamped to the canvas, so a near-square landscape
/// page can come out taller than a 16:9 canvas.
pub fn fit_size(src_width: u32, src_height: u32, canvas: Canvas) -> (u32, u32) {
    let aspect = f64::from(src_width) / f64::from(src_height);
    if src_width > src_height {
        let h = (f64::from(canvas.width) / aspect).round_ties_even().max(1.0);
        (canvas.width, h as u32)
    } else {
        let w = (f64::from(canvas.height) * aspect).round_ties_even().max(1.0);
        (w as u32, canvas.height)
    }
}

/// Letterbox `source` onto a canvas of exactly `spec.canvas` size.
///
/// The output is deterministic: the same source and spec always give identical pixels.
pub fn composite(source: &DynamicImage, spec: &CanvasSpec) -> SlideResult<RgbaImage> {
    ensure_non_degenerate(source, "source image")?;
    spec.canvas.validate()?;

    let (src_w, src_h) = source.dimensions();
    let layout = LetterboxLayout::compute(src_w, src_h, spec.canvas);

    let rgba = source.to_rgba8();
    let resized = if (src_w, src_h) == (layout.resized_width, layout.resized_height) {
        rgba
    } else {
        imageops::resize(
            &rgba,
            layout.resized_width,
            layout.resized_height,
            RESIZE_FILTER,
        )
    };

    let mut out = RgbaImage::from_pixel(
        spec.canvas.width,
        spec.canvas.height,
        Rgba(spec.pad.to_rgba()),
    );
    // Overflow past the canvas edge is clipped by `replace`.
    imageops::replace(
        &mut out,
        &resized,
        i64::from(layout.margins.left),
        i64::from(layout.margins.top),
    );
    Ok(out)
}

/// Letterbox an already decoded page.
#[tracing::instrument(skip(page, spec), fields(page = %page.path.display()))]
pub fn composite_page(page: &PageImage, spec: &CanvasSpec) -> SlideResult<RgbaImage> {
    tracing::debug!(
        width = page.width(),
        height = page.height(),
        ordinal = ?page.ordinal,
        "compositing page"
    );
    composite(&page.image, spec)
}

/// Decode a page image file and letterbox it.
pub fn composite_path(path: &Path, spec: &CanvasSpec) -> SlideResult<RgbaImage> {
    let page = load_page(path)?;
    composite_page(&page, spec)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;

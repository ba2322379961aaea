use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{DynamicImage, GenericImageView};

use crate::foundation::error::{SlideError, SlideResult};
use crate::order::natural::{page_ordinal, sort_paths_naturally};

/// File extensions recognized as page images (case-insensitive).
pub const PAGE_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A decoded page raster plus the ordinal parsed from its filename.
///
/// Immutable once decoded. Dropped after compositing.
#[derive(Clone, Debug)]
pub struct PageImage {
    /// Ordinal from the last digit run in the file stem, if any.
    pub ordinal: Option<u64>,
    /// File the page was decoded from.
    pub path: PathBuf,
    /// Decoded pixels.
    pub image: DynamicImage,
}

impl PageImage {
    /// Source width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Source height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Return `true` when `path` has a page image extension.
pub fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            PAGE_IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List page images directly inside `dir`, in natural filename order.
pub fn list_page_images(dir: &Path) -> SlideResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read page directory '{}'", dir.display()))?;

    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && is_page_image(&path) {
            pages.push(path);
        }
    }
    sort_paths_naturally(&mut pages);
    Ok(pages)
}

/// Decode encoded image bytes, rejecting degenerate rasters.
pub fn decode_image(bytes: &[u8]) -> SlideResult<DynamicImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| SlideError::invalid_image(format!("decode image from memory: {e}")))?;
    ensure_non_degenerate(&img, "in-memory image")?;
    Ok(img)
}

/// Read and decode one page image file.
///
/// A missing file, undecodable content, or a zero width/height is an
/// [`SlideError::InvalidImage`].
pub fn load_page(path: &Path) -> SlideResult<PageImage> {
    let img = image::open(path).map_err(|e| {
        SlideError::invalid_image(format!("decode page image '{}': {e}", path.display()))
    })?;
    ensure_non_degenerate(&img, &path.display().to_string())?;

    Ok(PageImage {
        ordinal: page_ordinal(path),
        path: path.to_path_buf(),
        image: img,
    })
}

pub(crate) fn ensure_non_degenerate(img: &DynamicImage, what: &str) -> SlideResult<()> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(SlideError::invalid_image(format!(
            "{what} has degenerate dimensions {w}x{h}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;

use std::path::Path;

use anyhow::Context as _;

use crate::assets::decode::list_page_images;
use crate::foundation::error::{SlideError, SlideResult};
use crate::raster::Rasterizer;

/// Treats a directory of page images as an already rasterized document.
///
/// Pages are copied into the working directory under their original names, so natural order
/// is preserved.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDirRasterizer;

impl Rasterizer for ImageDirRasterizer {
    fn rasterize(&self, document: &Path, out_dir: &Path) -> SlideResult<()> {
        if !document.is_dir() {
            return Err(SlideError::rasterize(format!(
                "'{}' is not a directory of page images",
                document.display()
            )));
        }

        for src in list_page_images(document)? {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dst = out_dir.join(name);
            std::fs::copy(&src, &dst).with_context(|| {
                format!("copy page '{}' to '{}'", src.display(), dst.display())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/image_dir.rs"]
mod tests;

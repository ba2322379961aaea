//! Slidereel turns a paged document into a letterboxed slideshow video.
//!
//! A conversion job runs four stages:
//!
//! - Rasterize the document into page images with a [`Rasterizer`]
//! - Letterbox every page onto a fixed canvas ([`composite`])
//! - Plan how many frames each page occupies ([`plan`])
//! - Stream the planned frames into a [`FrameSink`] and move the result into place
//!
//! [`SlideshowAssembler`] drives one job end to end and owns its working directory.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Page image discovery and decoding.
pub mod assets;
/// Letterbox compositing.
pub mod compose;
/// Job variables and slideshow settings.
pub mod config;
/// Encoding sinks.
pub mod encode;
/// Conversion jobs and the slideshow assembler.
pub mod job;
/// Natural filename ordering.
pub mod order;
/// Frame sequence planning.
pub mod plan;
/// Document rasterizers.
pub mod raster;

pub use crate::foundation::color::PadColor;
pub use crate::foundation::core::{Canvas, CanvasSpec, Fps, FrameIndex, SlideDuration};
pub use crate::foundation::error::{SlideError, SlideResult};

pub use crate::assets::decode::{PageImage, list_page_images, load_page};
pub use crate::compose::frame::{LetterboxLayout, Margins, composite, fit_size};
pub use crate::compose::pipeline::{CompositeThreading, composite_pages};
pub use crate::config::settings::SlideshowConfig;
pub use crate::config::variables::{JobVariables, default_variables_path};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::raw::RawRgbaSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, SinkGuard};
pub use crate::job::assembler::{ConversionJob, JobPhase, JobReport, SlideshowAssembler};
pub use crate::job::upload::{SourceGuard, stage_upload};
pub use crate::job::workspace::{JobWorkspace, WorkDir};
pub use crate::order::natural::{NaturalKey, natural_cmp, natural_key, sort_paths_naturally};
pub use crate::plan::sequence::{FramePlan, PlanEntry, plan};
pub use crate::raster::{ImageDirRasterizer, PdftoppmRasterizer, Rasterizer};

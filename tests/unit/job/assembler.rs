use image::{Rgba, RgbaImage};

use super::*;
use crate::encode::raw::RawRgbaSink;
use crate::encode::sink::InMemorySink;
use crate::foundation::color::PadColor;
use crate::raster::ImageDirRasterizer;

struct Fixture {
    root: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let root = PathBuf::from("target").join("unit_assembler").join(name);
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn pages(&self, sizes: &[(u32, u32)]) -> PathBuf {
        let dir = self.root.join("upload");
        std::fs::create_dir_all(&dir).unwrap();
        for (i, (w, h)) in sizes.iter().enumerate() {
            RgbaImage::from_pixel(*w, *h, Rgba([200, 10, 10, 255]))
                .save(dir.join(format!("page-{}.png", i + 1)))
                .unwrap();
        }
        dir
    }

    fn variables(&self, json: &str) -> PathBuf {
        let path = self.root.join("variables.dictionary");
        std::fs::write(&path, json).unwrap();
        path
    }

    fn job(&self, document: PathBuf, variables: PathBuf, output: &str) -> ConversionJob {
        ConversionJob {
            document,
            variables,
            output: self.root.join(output),
            work_dir: WorkDir::Keyed(self.root.join("temp")),
        }
    }

    fn leftover_jobs(&self) -> usize {
        std::fs::read_dir(self.root.join("temp"))
            .map(|it| it.count())
            .unwrap_or(0)
    }
}

fn spec() -> CanvasSpec {
    CanvasSpec::new(8, 6, PadColor::BLACK).unwrap()
}

/// Sink that accepts frames but never writes a file.
struct Discard;

impl FrameSink for Discard {
    fn begin(&mut self, _cfg: SinkConfig) -> SlideResult<()> {
        Ok(())
    }
    fn push_frame(&mut self, _frame: &RgbaImage) -> SlideResult<()> {
        Ok(())
    }
    fn end(&mut self) -> SlideResult<()> {
        Ok(())
    }
}

/// Sink that leaves a zero-byte file where the video should be.
struct EmptyFile;

impl FrameSink for EmptyFile {
    fn begin(&mut self, cfg: SinkConfig) -> SlideResult<()> {
        std::fs::write(&cfg.out_path, b"").map_err(anyhow::Error::from)?;
        Ok(())
    }
    fn push_frame(&mut self, _frame: &RgbaImage) -> SlideResult<()> {
        Ok(())
    }
    fn end(&mut self) -> SlideResult<()> {
        Ok(())
    }
}

#[test]
fn two_pages_three_seconds() {
    let fx = Fixture::new("two_pages");
    let doc = fx.pages(&[(40, 20), (20, 40)]);
    let vars = fx.variables(r#"{"duration": "3"}"#);
    let job = fx.job(doc.clone(), vars, "out/video.rgba");

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let report = assembler.run(&job, &mut RawRgbaSink::new()).unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.frames, 180);
    assert_eq!(report.duration.secs(), 3);
    assert_eq!(
        std::fs::metadata(&job.output).unwrap().len(),
        180 * spec().canvas.rgba_len() as u64
    );
    assert_eq!(assembler.phase(), JobPhase::Done);
    assert_eq!(fx.leftover_jobs(), 0);
    assert!(!doc.exists());
}

#[test]
fn phases_are_recorded_in_order() {
    let fx = Fixture::new("history");
    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": 1}"#);
    let job = fx.job(doc, vars, "video.rgba");

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    assembler.run(&job, &mut RawRgbaSink::new()).unwrap();
    assert_eq!(
        assembler.history(),
        &[
            JobPhase::Idle,
            JobPhase::Extracting,
            JobPhase::Compositing,
            JobPhase::Encoding,
            JobPhase::Finalizing,
            JobPhase::Done,
        ]
    );
}

#[test]
fn frames_follow_natural_page_order() {
    let fx = Fixture::new("order");
    let dir = fx.root.join("upload");
    std::fs::create_dir_all(&dir).unwrap();
    RgbaImage::from_pixel(8, 6, Rgba([1, 1, 1, 255]))
        .save(dir.join("page-2.png"))
        .unwrap();
    RgbaImage::from_pixel(8, 6, Rgba([10, 10, 10, 255]))
        .save(dir.join("page-10.png"))
        .unwrap();
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let job = fx.job(dir, vars, "video.rgba");

    let mut sink = InMemorySink::new();
    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    // The in-memory sink writes no file, so finalizing fails after every frame is pushed.
    let err = assembler.run(&job, &mut sink).unwrap_err();
    assert!(matches!(err, SlideError::Encoding(_)));

    assert_eq!(sink.frames().len(), 60);
    assert_eq!(sink.frames()[0].get_pixel(0, 0), &Rgba([1, 1, 1, 255]));
    assert_eq!(sink.frames()[59].get_pixel(0, 0), &Rgba([10, 10, 10, 255]));
    assert_eq!((sink.begin_calls(), sink.end_calls()), (1, 1));
}

#[test]
fn bad_duration_falls_back_to_default() {
    let fx = Fixture::new("fallback");
    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": "abc"}"#);
    let job = fx.job(doc, vars, "video.rgba");

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let report = assembler.run(&job, &mut RawRgbaSink::new()).unwrap();
    assert_eq!(report.duration, SlideDuration::DEFAULT);
    assert_eq!(report.frames, 150);
}

#[test]
fn missing_temp_video_keeps_previous_output() {
    let fx = Fixture::new("no_temp");
    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let job = fx.job(doc.clone(), vars, "video.mp4");
    std::fs::write(&job.output, b"previous").unwrap();

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let err = assembler.run(&job, &mut Discard).unwrap_err();

    assert!(matches!(err, SlideError::Encoding(_)));
    assert_eq!(std::fs::read(&job.output).unwrap(), b"previous");
    assert_eq!(assembler.phase(), JobPhase::Failed);
    assert_eq!(
        assembler.history()[assembler.history().len() - 2],
        JobPhase::Finalizing
    );
    assert_eq!(fx.leftover_jobs(), 0);
    assert!(!doc.exists());
}

#[test]
fn zero_byte_temp_video_keeps_previous_output() {
    let fx = Fixture::new("zero_byte");
    let doc = fx.pages(&[(8, 6), (6, 8)]);
    let vars = fx.variables(r#"{"duration": "3"}"#);
    let job = fx.job(doc.clone(), vars, "video.mp4");
    std::fs::write(&job.output, b"previous").unwrap();

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let err = assembler.run(&job, &mut EmptyFile).unwrap_err();

    assert!(matches!(err, SlideError::Encoding(_)));
    assert_eq!(assembler.phase(), JobPhase::Failed);
    assert_eq!(std::fs::read(&job.output).unwrap(), b"previous");
    assert_eq!(fx.leftover_jobs(), 0);
    assert!(!doc.exists());
}

#[test]
fn cleanup_failure_after_move_is_reported() {
    let fx = Fixture::new("cleanup_failure");
    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let job = fx.job(doc.clone(), vars, "video.rgba");

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    assembler.remove_workspace = |ws| {
        Err(SlideError::cleanup(format!(
            "failed to delete working directory '{}'",
            ws.root().display()
        )))
    };
    let err = assembler.run(&job, &mut RawRgbaSink::new()).unwrap_err();

    assert!(matches!(err, SlideError::Cleanup(_)));
    assert_eq!(assembler.phase(), JobPhase::Failed);
    assert_eq!(
        assembler.history()[assembler.history().len() - 2],
        JobPhase::Finalizing
    );
    assert_eq!(
        std::fs::metadata(&job.output).unwrap().len(),
        30 * spec().canvas.rgba_len() as u64
    );
    assert!(!doc.exists());
    assert_eq!(fx.leftover_jobs(), 1);
}

#[test]
fn output_inside_exact_work_dir_is_rejected() {
    let fx = Fixture::new("output_in_work_dir");
    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let work = fx.root.join("files");
    let mut job = fx.job(doc.clone(), vars, "files/output_video.rgba");
    job.work_dir = WorkDir::Exact(work.clone());

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let err = assembler.run(&job, &mut RawRgbaSink::new()).unwrap_err();

    assert!(matches!(err, SlideError::Validation(_)));
    assert_eq!(assembler.history(), &[JobPhase::Idle, JobPhase::Failed]);
    assert!(!job.output.exists());
    assert!(!work.exists());
    assert!(!doc.exists());
}

#[test]
fn output_beside_exact_work_dir_is_accepted() {
    let fx = Fixture::new("output_beside_work_dir");
    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let mut job = fx.job(doc, vars, "files/output_video.rgba");
    job.work_dir = WorkDir::Exact(fx.root.join("files/temp"));

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    assembler.run(&job, &mut RawRgbaSink::new()).unwrap();
    assert!(job.output.is_file());
    assert!(!fx.root.join("files/temp").exists());
}

#[test]
fn invalid_page_fails_and_cleans_up() {
    let fx = Fixture::new("invalid_page");
    let doc = fx.pages(&[(8, 6)]);
    std::fs::write(doc.join("page-2.png"), b"not a png").unwrap();
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let job = fx.job(doc.clone(), vars, "video.rgba");

    let mut sink = InMemorySink::new();
    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let err = assembler.run(&job, &mut sink).unwrap_err();

    assert!(matches!(err, SlideError::InvalidImage(_)));
    assert_eq!(sink.begin_calls(), 0);
    assert!(!job.output.exists());
    assert_eq!(fx.leftover_jobs(), 0);
    assert!(!doc.exists());
}

#[test]
fn empty_document_is_a_rasterize_error() {
    let fx = Fixture::new("empty");
    let doc = fx.pages(&[]);
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let job = fx.job(doc, vars, "video.rgba");

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let err = assembler.run(&job, &mut RawRgbaSink::new()).unwrap_err();
    assert!(matches!(err, SlideError::Rasterize(_)));
    assert_eq!(
        assembler.history(),
        &[JobPhase::Idle, JobPhase::Extracting, JobPhase::Failed]
    );
}

#[test]
fn missing_variables_file_is_fatal() {
    let fx = Fixture::new("no_variables");
    let doc = fx.pages(&[(8, 6)]);
    let job = fx.job(doc.clone(), fx.root.join("absent.dictionary"), "video.rgba");

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let err = assembler.run(&job, &mut RawRgbaSink::new()).unwrap_err();
    assert!(matches!(err, SlideError::Configuration(_)));
    assert_eq!(assembler.history(), &[JobPhase::Idle, JobPhase::Failed]);
    assert!(!doc.exists());
}

#[test]
fn exact_work_dir_drops_stale_pages() {
    let fx = Fixture::new("exact");
    let work = fx.root.join("work");
    let stale = work.join("extracted_images");
    std::fs::create_dir_all(&stale).unwrap();
    RgbaImage::from_pixel(8, 6, Rgba([0, 0, 0, 255]))
        .save(stale.join("page-9.png"))
        .unwrap();

    let doc = fx.pages(&[(8, 6)]);
    let vars = fx.variables(r#"{"duration": "1"}"#);
    let mut job = fx.job(doc, vars, "video.rgba");
    job.work_dir = WorkDir::Exact(work.clone());

    let mut assembler = SlideshowAssembler::new(&ImageDirRasterizer, spec());
    let report = assembler.run(&job, &mut RawRgbaSink::new()).unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.frames, 30);
    assert!(!work.exists());
}

#[test]
fn parallel_compositing_matches_sequential() {
    let sizes = [(40, 20), (20, 40), (8, 6), (3, 3)];

    let run = |name: &str, threading: CompositeThreading| {
        let fx = Fixture::new(name);
        let doc = fx.pages(&sizes);
        let vars = fx.variables(r#"{"duration": "1"}"#);
        let job = fx.job(doc, vars, "video.rgba");
        let mut assembler =
            SlideshowAssembler::new(&ImageDirRasterizer, spec()).with_threading(threading);
        assembler.run(&job, &mut RawRgbaSink::new()).unwrap();
        std::fs::read(&job.output).unwrap()
    };

    let sequential = run("sequential", CompositeThreading::default());
    let parallel = run(
        "parallel",
        CompositeThreading {
            parallel: true,
            threads: Some(2),
        },
    );
    assert_eq!(sequential, parallel);
}

#[test]
fn finalize_rejects_empty_temp() {
    let fx = Fixture::new("finalize_empty");
    let temp = fx.root.join("temp.mp4");
    std::fs::write(&temp, b"").unwrap();
    let err = finalize_output(&temp, &fx.root.join("out.mp4")).unwrap_err();
    assert!(matches!(err, SlideError::Encoding(_)));
    assert!(!fx.root.join("out.mp4").exists());
}

#[test]
fn finalize_replaces_existing_output() {
    let fx = Fixture::new("finalize_replace");
    let temp = fx.root.join("temp.mp4");
    let out = fx.root.join("nested/out.mp4");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();
    std::fs::write(&out, b"old").unwrap();
    std::fs::write(&temp, b"new video").unwrap();

    finalize_output(&temp, &out).unwrap();
    assert_eq!(std::fs::read(&out).unwrap(), b"new video");
    assert!(!temp.exists());
}

#[test]
fn phase_display_and_terminal() {
    assert_eq!(JobPhase::Compositing.to_string(), "compositing");
    assert!(JobPhase::Done.is_terminal());
    assert!(JobPhase::Failed.is_terminal());
    assert!(!JobPhase::Encoding.is_terminal());
    assert!(JobPhase::Encoding.can_enter(JobPhase::Failed));
    assert!(!JobPhase::Done.can_enter(JobPhase::Failed));
    assert!(!JobPhase::Idle.can_enter(JobPhase::Encoding));
}

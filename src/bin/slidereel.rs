use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use slidereel::config::variables::JobVariables;
use slidereel::{
    CompositeThreading, ConversionJob, FfmpegSink, FfmpegSinkOpts, FrameSink, ImageDirRasterizer,
    PadColor, PdftoppmRasterizer, RawRgbaSink, Rasterizer, SlideshowAssembler,
    SlideshowConfig, WorkDir,
};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    /// Log pipeline progress to stderr (repeat for debug output).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a PDF (or a directory of page images) into a slideshow video.
    Convert(ConvertArgs),
    /// Letterbox a single page image into a PNG.
    Frame(FrameArgs),
    /// Print the page order and frame counts for a directory of page images.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct CanvasArgs {
    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Letterbox color as #RRGGBB or #RRGGBBAA.
    #[arg(long)]
    pad_color: Option<PadColor>,
}

impl CanvasArgs {
    fn apply(&self, cfg: &mut SlideshowConfig) {
        if let Some(w) = self.width {
            cfg.canvas.width = w;
        }
        if let Some(h) = self.height {
            cfg.canvas.height = h;
        }
        if let Some(pad) = self.pad_color {
            cfg.pad_color = pad;
        }
    }
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input PDF, or a directory of page images.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Variables file holding the slide duration.
    #[arg(long)]
    variables: Option<PathBuf>,

    /// Output video path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Root under which a fresh per-job working directory is created.
    #[arg(long, conflicts_with = "work_dir")]
    work_root: Option<PathBuf>,

    /// Use this exact working directory (stale pages in it are cleared).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    canvas: CanvasArgs,

    /// Encoder to write the video with.
    #[arg(long, value_enum, default_value_t = EncoderChoice::Ffmpeg)]
    encoder: EncoderChoice,

    /// Composite pages in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Rasterization DPI for PDF input.
    #[arg(long)]
    dpi: Option<u32>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input page image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Directory of page images.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Variables file holding the slide duration.
    #[arg(long)]
    variables: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EncoderChoice {
    /// H.264 MP4 through the system `ffmpeg`.
    Ffmpeg,
    /// Headerless RGBA frames.
    Raw,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => return,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SlideshowConfig> {
    Ok(match path {
        Some(p) => SlideshowConfig::from_path(p)?,
        None => SlideshowConfig::default(),
    })
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    args.canvas.apply(&mut cfg);
    if let Some(out) = args.out {
        cfg.output = out;
    }
    if let Some(root) = args.work_root {
        cfg.work_root = root;
    }
    if let Some(dpi) = args.dpi {
        cfg.dpi = dpi;
    }
    if args.parallel || args.threads.is_some() {
        cfg.threading = CompositeThreading {
            parallel: args.parallel || cfg.threading.parallel,
            threads: args.threads.or(cfg.threading.threads),
        };
    }
    cfg.validate()?;

    let variables = args
        .variables
        .unwrap_or_else(slidereel::default_variables_path);
    let work_dir = match args.work_dir {
        Some(dir) => WorkDir::Exact(dir),
        None => WorkDir::Keyed(cfg.work_root.clone()),
    };

    let document = slidereel::stage_upload(&args.in_path, &cfg.upload_dir)?;
    let job = ConversionJob {
        document: document.clone(),
        variables,
        output: cfg.output.clone(),
        work_dir,
    };

    let pdftoppm;
    let rasterizer: &dyn Rasterizer = if document.is_dir() {
        &ImageDirRasterizer
    } else {
        pdftoppm = PdftoppmRasterizer::new(cfg.dpi)?;
        &pdftoppm
    };

    let mut sink: Box<dyn FrameSink> = match args.encoder {
        EncoderChoice::Ffmpeg => Box::new(FfmpegSink::new(FfmpegSinkOpts {
            overwrite: true,
            bg: cfg.pad_color,
        })),
        EncoderChoice::Raw => Box::new(RawRgbaSink::new()),
    };

    let mut assembler = SlideshowAssembler::new(rasterizer, cfg.canvas_spec())
        .with_threading(cfg.threading.clone());
    let report = assembler.run(&job, sink.as_mut())?;

    println!("{}", report.output.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    args.canvas.apply(&mut cfg);
    cfg.validate()?;

    let frame = slidereel::compose::frame::composite_path(&args.in_path, &cfg.canvas_spec())?;

    slidereel::encode::ensure_parent_dir(&args.out)?;
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let variables = args
        .variables
        .unwrap_or_else(slidereel::default_variables_path);
    let duration = JobVariables::from_path(&variables)?.duration();
    let pages = slidereel::list_page_images(&args.in_path)?;
    let plan = slidereel::plan(&pages, duration, slidereel::Fps::SLIDESHOW);

    for (i, entry) in plan.entries().iter().enumerate() {
        println!("{:>4}  {:>6}  {}", i + 1, entry.repeat, entry.item.display());
    }
    println!(
        "{} pages, {}s each at {} fps, {} frames",
        plan.len(),
        duration.secs(),
        plan.fps().get(),
        plan.total_frames()
    );
    Ok(())
}

use std::path::PathBuf;
use std::process;

use clap::Parser;

use footfall_core::detection::infrastructure::jsonl_detection_source::JsonlDetectionSource;
use footfall_core::heatmap::domain::colormap::Colormap;
use footfall_core::heatmap::domain::heatmap_engine::HeatmapEngine;
use footfall_core::pipeline::accumulate_heatmap_use_case::AccumulateHeatmapUseCase;
use footfall_core::pipeline::emit_dispatcher::{EmitDispatcher, InlineEmitDispatcher};
use footfall_core::pipeline::heatmap_renderer::HeatmapRenderer;
use footfall_core::pipeline::infrastructure::threaded_emit_dispatcher::ThreadedEmitDispatcher;
use footfall_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use footfall_core::shared::heatmap_config::HeatmapConfig;
use footfall_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use footfall_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Pedestrian density heatmaps from a video and its detection log.
#[derive(Parser)]
#[command(name = "footfall")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// JSON-lines detection log, one `{"frame": n, "objects": [...]}` per line.
    #[arg(long)]
    detections: PathBuf,

    /// Heatmap overlay image, overwritten on every emit.
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Density grid width (frames are scaled to match).
    #[arg(long)]
    width: Option<u32>,

    /// Density grid height (frames are scaled to match).
    #[arg(long)]
    height: Option<u32>,

    /// Amount every cell fades per frame.
    #[arg(long)]
    decay: Option<u16>,

    /// Radius of the disc stamped at each person's feet, in pixels.
    #[arg(long)]
    radius: Option<u32>,

    /// Density added per stamp.
    #[arg(long)]
    increment: Option<u16>,

    /// Weight of the video frame in the overlay (0.0-1.0).
    #[arg(long)]
    alpha: Option<f32>,

    /// Write the overlay every Nth frame.
    #[arg(long)]
    interval: Option<u64>,

    /// Colormap: jet or hot.
    #[arg(long)]
    colormap: Option<String>,

    /// Render overlays on the main thread instead of a worker.
    #[arg(long)]
    sync: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    let config = build_config(&cli)?;

    let engine = HeatmapEngine::new(&config)?;
    let reader = FfmpegReader::new(config.grid_width, config.grid_height);
    let detections = JsonlDetectionSource::open(&cli.detections)?;
    let renderer = HeatmapRenderer::from_config(&config, Box::new(ImageFileWriter::new()));
    let dispatcher: Box<dyn EmitDispatcher> = if cli.sync {
        Box::new(InlineEmitDispatcher::new(renderer))
    } else {
        Box::new(ThreadedEmitDispatcher::new(
            renderer,
            config.emit_queue_capacity,
        ))
    };

    let mut use_case = AccumulateHeatmapUseCase::new(
        Box::new(reader),
        Box::new(detections),
        engine,
        dispatcher,
        Box::new(StdoutPipelineLogger::default()),
        None,
        None,
    );
    let summary = use_case.execute(&cli.input)?;

    if summary.emits.written == 0 {
        log::warn!(
            "No heatmap written ({} frames, interval {})",
            summary.ticks,
            config.render_interval
        );
    } else {
        log::info!("Heatmap written to {}", config.output_path.display());
    }
    Ok(())
}

/// Defaults, then the config file, then individual flags.
fn build_config(cli: &Cli) -> Result<HeatmapConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => HeatmapConfig::load(path)?,
        None => HeatmapConfig::default(),
    };

    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }
    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }
    if let Some(decay) = cli.decay {
        config.decay_constant = decay;
    }
    if let Some(radius) = cli.radius {
        config.stamp_radius = radius;
    }
    if let Some(increment) = cli.increment {
        config.stamp_increment = increment;
    }
    if let Some(alpha) = cli.alpha {
        config.blend_alpha = alpha;
    }
    if let Some(interval) = cli.interval {
        config.render_interval = interval;
    }
    if let Some(name) = &cli.colormap {
        config.colormap = name.parse::<Colormap>()?;
    }

    config.validate()?;
    Ok(config)
}

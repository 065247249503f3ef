use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use depthviz_core::depth::domain::depth_estimator::DepthEstimator;
use depthviz_core::depth::infrastructure::execution_provider::accelerator_label;
use depthviz_core::depth::infrastructure::onnx_depth_estimator::OnnxDepthEstimator;
use depthviz_core::pipeline::infrastructure::sequential_pipeline_executor::SequentialPipelineExecutor;
use depthviz_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use depthviz_core::pipeline::render_depth_video_use_case::{
    RenderDepthVideoUseCase, RenderReport, RenderSettings,
};
use depthviz_core::rendering::domain::palette::{Palette, PALETTE_NAMES};
use depthviz_core::shared::constants::PROGRESS_LOG_INTERVAL;
use depthviz_core::shared::error::DepthVizError;
use depthviz_core::shared::model_resolver::{self, ModelResolveError, ModelSize};
use depthviz_core::shared::resolution_planner::TargetHeight;
use depthviz_core::video::infrastructure::ffmpeg_cli_finisher::FfmpegCliFinisher;
use depthviz_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use depthviz_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use depthviz_core::video::infrastructure::source_fetcher::SourceFetcher;

/// Render a depth-visualization video from a local file or URL.
#[derive(Parser, Debug)]
#[command(name = "depthviz")]
struct Cli {
    /// Input video file, direct video URL, or any URL yt-dlp understands.
    input: String,

    /// Output file (default: depth_out_<timestamp>_<resolution>.mp4).
    output: Option<PathBuf>,

    /// Depth model size: small, base, large.
    #[arg(long, default_value = "small")]
    model_size: ModelSize,

    /// Use this ONNX model instead of resolving one by size.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Output height in pixels (e.g. 480 or 480p), or "native". Never upscales.
    #[arg(long, default_value = "480")]
    resolution: TargetHeight,

    /// Colour palette: gray, inferno, magma, plasma, viridis, jet, turbo, hot, bone.
    #[arg(long, default_value = "gray")]
    palette: String,

    /// Number of frames averaged to reduce flicker (1 disables smoothing).
    #[arg(long, default_value = "3")]
    smooth_window: usize,

    /// Directory for downloaded source videos.
    #[arg(long, default_value = ".")]
    download_dir: PathBuf,

    /// ffmpeg executable used for the final H.264 encode.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
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
    validate(&cli)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            eprintln!("\nForce quit");
            process::exit(130);
        }
        eprintln!("\nStopping after the current frame (Ctrl-C again to abort)...");
    })?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_name(cli.resolution));

    match render(&cli, &output, cancelled) {
        Ok(()) => Ok(()),
        Err(e) => Err(format!("{} stage: {e}", e.stage()).into()),
    }
}

fn render(cli: &Cli, output: &Path, cancelled: Arc<AtomicBool>) -> Result<(), DepthVizError> {
    let palette = Palette::from_name(&cli.palette);
    let settings = RenderSettings {
        target_height: cli.resolution,
        palette,
        smooth_window: cli.smooth_window,
    };

    let fetcher = SourceFetcher::new(&cli.download_dir);
    let input = fetcher.resolve(&cli.input)?;

    let estimator = build_estimator(cli)?;

    let intermediate = intermediate_path_for(output);

    let mut use_case = RenderDepthVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new()),
        estimator,
        Box::new(FfmpegCliFinisher::with_program(&cli.ffmpeg)),
        Box::new(SequentialPipelineExecutor::new()),
        settings,
    )
    .with_cancel_flag(cancelled)
    .with_logger(Box::new(StdoutPipelineLogger::new(PROGRESS_LOG_INTERVAL)));

    // Progress is reported by the pipeline logger alone.
    let report = use_case.execute(&input, &intermediate, output)?;

    let (level, message) = outcome_message(&report, palette);
    log::log!(level, "{message}");
    Ok(())
}

fn outcome_message(report: &RenderReport, palette: Palette) -> (log::Level, String) {
    match (&report.output_path, report.cancelled) {
        (None, _) => (
            log::Level::Warn,
            "Interrupted before the first frame; no output written".to_string(),
        ),
        (Some(path), true) => (
            log::Level::Warn,
            format!(
                "Interrupted: {} frames written to {}",
                report.frames_written,
                path.display()
            ),
        ),
        (Some(path), false) => (
            log::Level::Info,
            format!(
                "Wrote {} frames ({}x{} -> {}x{}, {palette}) to {}",
                report.frames_written,
                report.source.0,
                report.source.1,
                report.target.0,
                report.target.1,
                path.display()
            ),
        ),
    }
}

fn build_estimator(cli: &Cli) -> Result<Box<dyn DepthEstimator>, DepthVizError> {
    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving depth model: {}", cli.model_size);
            let path = model_resolver::resolve_model(
                cli.model_size,
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };

    log::info!(
        "Loading {} on {}",
        model_path.display(),
        accelerator_label()
    );
    let estimator = OnnxDepthEstimator::new(&model_path).map_err(|e| ModelResolveError::Load {
        path: model_path.clone(),
        reason: e.to_string(),
    })?;
    Ok(Box::new(estimator))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.input.trim().is_empty() {
        return Err("Input must be a file path or URL".into());
    }
    if cli.smooth_window == 0 {
        return Err("Smooth window must be at least 1".into());
    }
    if let Some(model) = &cli.model {
        if !model.is_file() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if cli.palette.parse::<Palette>().is_err() {
        log::warn!(
            "Unknown palette '{}'; known palettes: {}",
            cli.palette,
            PALETTE_NAMES.join(", ")
        );
    }
    Ok(())
}

fn default_output_name(resolution: TargetHeight) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("depth_out_{secs}_{resolution}.mp4"))
}

/// Staging file for the MPEG-4 intermediate, next to the final output.
fn intermediate_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("depth_out");
    output.with_file_name(format!("{stem}.intermediate.mp4"))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading depth model... {pct}%");
    } else {
        eprint!("\rDownloading depth model... {downloaded} bytes");
    }
}

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::depth::domain::depth_estimator::DepthEstimator;
use crate::depth::domain::temporal_smoother::TemporalSmoother;
use crate::rendering::domain::depth_renderer::DepthRenderer;
use crate::rendering::domain::palette::Palette;
use crate::shared::constants::{DEFAULT_SMOOTH_WINDOW, DEFAULT_TARGET_HEIGHT};
use crate::shared::error::DepthVizError;
use crate::shared::resolution_planner::{plan_for, TargetHeight};
use crate::video::domain::video_finisher::VideoFinisher;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_executor::{
    DepthStages, PipelineConfig, PipelineExecutor, ProgressCallback,
};
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};

/// User-facing knobs for one render. All independent of each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    pub target_height: TargetHeight,
    pub palette: Palette,
    /// Frames averaged by the temporal smoother; values below 1 act as 1.
    pub smooth_window: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            target_height: TargetHeight::Pixels(DEFAULT_TARGET_HEIGHT),
            palette: Palette::Gray,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
        }
    }
}

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    /// `None` when the run was cancelled before any frame was rendered.
    pub output_path: Option<PathBuf>,
    pub frames_written: usize,
    /// True when the run stopped early; the output holds the frames
    /// rendered up to that point.
    pub cancelled: bool,
    pub source: (u32, u32),
    pub target: (u32, u32),
}

/// Renders a source video into a depth-visualization video.
///
/// Opens the source, plans the output size, delegates the frame loop to a
/// `PipelineExecutor` and hands the intermediate to a `VideoFinisher`.
/// Single-use: `execute` consumes the owned components, so a second call
/// fails.
pub struct RenderDepthVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    estimator: Option<Box<dyn DepthEstimator>>,
    finisher: Box<dyn VideoFinisher>,
    executor: Box<dyn PipelineExecutor>,
    settings: RenderSettings,
    on_progress: Option<ProgressCallback>,
    cancelled: Arc<AtomicBool>,
    logger: Option<Box<dyn PipelineLogger>>,
}

impl RenderDepthVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        estimator: Box<dyn DepthEstimator>,
        finisher: Box<dyn VideoFinisher>,
        executor: Box<dyn PipelineExecutor>,
        settings: RenderSettings,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            estimator: Some(estimator),
            finisher,
            executor,
            settings,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            logger: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Shares a cancellation flag with the caller (e.g. a Ctrl-C handler).
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Renders `input` to `output`, staging frames in `intermediate`.
    ///
    /// A cancelled run still finishes the frames rendered so far; one
    /// cancelled before its first frame skips the encode and produces no
    /// file. On any error no final file is produced.
    pub fn execute(
        &mut self,
        input: &Path,
        intermediate: &Path,
        output: &Path,
    ) -> Result<RenderReport, DepthVizError> {
        let already_run = || DepthVizError::resource("pipeline", "pipeline already executed");
        let mut reader = self.reader.take().ok_or_else(already_run)?;
        let writer = self.writer.take().ok_or_else(already_run)?;
        let estimator = self.estimator.take().ok_or_else(already_run)?;

        let source = reader
            .open(input)
            .map_err(|e| DepthVizError::acquisition(input.display().to_string(), e))?;

        let target = match plan_for(source.width, source.height, self.settings.target_height) {
            Ok(target) => target,
            Err(e) => {
                reader.close();
                return Err(e);
            }
        };
        log::info!(
            "Source {}x{} @ {:.2} fps, ~{} frames; output {}x{}",
            source.width,
            source.height,
            source.fps,
            source.total_frames,
            target.0,
            target.1
        );

        let stages = DepthStages {
            estimator,
            smoother: TemporalSmoother::new(self.settings.smooth_window),
            renderer: DepthRenderer::new(self.settings.palette),
        };
        let config = PipelineConfig {
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
            logger: self
                .logger
                .take()
                .unwrap_or_else(|| Box::new(NullPipelineLogger)),
        };

        let summary =
            self.executor
                .execute(reader, writer, stages, &source, target, intermediate, config)?;

        let output_path = if summary.cancelled && summary.frames_written == 0 {
            log::warn!("Cancelled before the first frame; skipping encode");
            if intermediate.exists() {
                if let Err(e) = std::fs::remove_file(intermediate) {
                    log::warn!("Could not remove {}: {e}", intermediate.display());
                }
            }
            None
        } else {
            if summary.cancelled {
                log::warn!(
                    "Stopped after {} frames; encoding partial output",
                    summary.frames_written
                );
            }
            Some(self.finisher.finish(intermediate, output)?)
        };

        Ok(RenderReport {
            output_path,
            frames_written: summary.frames_written,
            cancelled: summary.cancelled,
            source: (source.width, source.height),
            target,
        })
    }
}

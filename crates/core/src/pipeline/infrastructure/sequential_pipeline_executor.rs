use std::path::Path;
use std::time::Instant;

use crate::pipeline::pipeline_executor::{DepthStages, PipelineConfig, PipelineExecutor, RunSummary};
use crate::shared::error::DepthVizError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Runs the render loop on the calling thread, one frame at a time.
///
/// Only one decoded frame and the smoothing window are alive at once, so
/// memory does not grow with video length. Cancellation is checked before
/// each frame is pulled from the reader.
#[derive(Debug, Default)]
pub struct SequentialPipelineExecutor;

impl SequentialPipelineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineExecutor for SequentialPipelineExecutor {
    fn execute(
        &self,
        mut reader: Box<dyn VideoReader>,
        mut writer: Box<dyn VideoWriter>,
        mut stages: DepthStages,
        source: &VideoMetadata,
        target: (u32, u32),
        intermediate_path: &Path,
        mut config: PipelineConfig,
    ) -> Result<RunSummary, DepthVizError> {
        let out_meta = source.with_dimensions(target.0, target.1);
        if let Err(e) = writer.open(intermediate_path, &out_meta) {
            reader.close();
            return Err(DepthVizError::resource(
                "writer",
                format!("cannot open {}: {e}", intermediate_path.display()),
            ));
        }

        config.logger.info(&format!(
            "Rendering {}x{} -> {}x{} with {} palette, smoothing window {}",
            source.width,
            source.height,
            target.0,
            target.1,
            stages.renderer.palette(),
            stages.smoother.capacity()
        ));

        let outcome = run_frames(&mut *reader, &mut *writer, &mut stages, source, target, &mut config);

        reader.close();
        let closed = writer.close();
        config.logger.summary();

        let summary = outcome?;
        closed.map_err(|e| DepthVizError::resource("writer", format!("finalizing: {e}")))?;
        Ok(summary)
    }
}

fn run_frames(
    reader: &mut dyn VideoReader,
    writer: &mut dyn VideoWriter,
    stages: &mut DepthStages,
    source: &VideoMetadata,
    target: (u32, u32),
    config: &mut PipelineConfig,
) -> Result<RunSummary, DepthVizError> {
    let (width, height) = target;
    let total = source.total_frames;
    let mut written = 0;
    let mut frames = reader.frames();

    loop {
        if config.is_cancelled() {
            config
                .logger
                .info(&format!("Cancelled after {written} frames"));
            return Ok(RunSummary {
                frames_written: written,
                cancelled: true,
            });
        }

        let Some(next) = frames.next() else {
            break;
        };
        let frame = next.map_err(|e| DepthVizError::resource("decode", e))?;
        let index = frame.index();
        let inference_err = |e: Box<dyn std::error::Error>| DepthVizError::Inference {
            frame: index,
            reason: e.to_string(),
        };

        let t = Instant::now();
        let resized = frame.resized(width, height).map_err(inference_err)?;
        config.logger.timing("resize", elapsed_ms(t));

        let t = Instant::now();
        let raw_depth = stages.estimator.estimate(&resized).map_err(inference_err)?;
        config.logger.timing("infer", elapsed_ms(t));

        let t = Instant::now();
        let depth = raw_depth.resize_bicubic(width, height);
        config.logger.timing("upscale", elapsed_ms(t));

        let t = Instant::now();
        let smoothed = stages
            .smoother
            .push(depth)
            .map_err(|e| DepthVizError::resource("smooth", e))?;
        config.logger.timing("smooth", elapsed_ms(t));

        let t = Instant::now();
        let rendered = stages.renderer.render(&smoothed, index);
        config.logger.timing("render", elapsed_ms(t));

        let t = Instant::now();
        writer
            .write(&rendered)
            .map_err(|e| DepthVizError::resource("writer", format!("frame {index}: {e}")))?;
        config.logger.timing("write", elapsed_ms(t));

        written += 1;
        config.logger.progress(written, total);
        if let Some(ref on_progress) = config.on_progress {
            if !on_progress(written, total) {
                config.cancelled.store(true, std::sync::atomic::Ordering::Relaxed);
            }
        }
    }

    Ok(RunSummary {
        frames_written: written,
        cancelled: false,
    })
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

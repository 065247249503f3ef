use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::depth::domain::depth_estimator::DepthEstimator;
use crate::depth::domain::temporal_smoother::TemporalSmoother;
use crate::rendering::domain::depth_renderer::DepthRenderer;
use crate::shared::error::DepthVizError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};

/// Progress callback: `(frames_written, total_frames)`. Returning `false`
/// asks the run to stop at the next frame boundary.
pub type ProgressCallback = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Per-run knobs that are not pipeline components.
pub struct PipelineConfig {
    pub on_progress: Option<ProgressCallback>,
    pub cancelled: Arc<AtomicBool>,
    pub logger: Box<dyn PipelineLogger>,
}

impl PipelineConfig {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            logger: Box::new(NullPipelineLogger),
        }
    }
}

/// Depth-specific stages applied to every frame, in order.
pub struct DepthStages {
    pub estimator: Box<dyn DepthEstimator>,
    pub smoother: TemporalSmoother,
    pub renderer: DepthRenderer,
}

/// Outcome of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_written: usize,
    /// The loop stopped early on request rather than at end of stream.
    pub cancelled: bool,
}

/// Port for running decode → infer → smooth → render → write.
///
/// `reader` arrives already opened on the source described by `source`.
/// The executor opens `writer` on `intermediate_path` at `target`
/// dimensions and must close both before returning, whatever the outcome.
pub trait PipelineExecutor: Send {
    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        stages: DepthStages,
        source: &VideoMetadata,
        target: (u32, u32),
        intermediate_path: &Path,
        config: PipelineConfig,
    ) -> Result<RunSummary, DepthVizError>;
}

use thiserror::Error;

use super::model_resolver::ModelResolveError;

/// Failure taxonomy for a depth-video run.
///
/// Ports (`VideoReader`, `DepthEstimator`, ...) report boxed errors; the
/// pipeline classifies them into one of these variants depending on the
/// stage they came from.
#[derive(Error, Debug)]
pub enum DepthVizError {
    #[error("could not acquire source video {input}: {reason}")]
    Acquisition { input: String, reason: String },

    #[error("depth inference failed at frame {frame}: {reason}")]
    Inference { frame: usize, reason: String },

    #[error("final encode failed: {0}")]
    Encode(String),

    #[error("{stage} failed: {reason}")]
    Resource { stage: &'static str, reason: String },

    #[error("invalid source dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("depth model unavailable: {0}")]
    Model(#[from] ModelResolveError),
}

impl DepthVizError {
    pub fn acquisition(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Acquisition {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    pub fn resource(stage: &'static str, reason: impl ToString) -> Self {
        Self::Resource {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Short name of the pipeline stage that failed, for user-facing reports.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Acquisition { .. } => "acquisition",
            Self::Inference { .. } => "inference",
            Self::Encode(_) => "encode",
            Self::Resource { stage, .. } => *stage,
            Self::InvalidDimensions { .. } => "planning",
            Self::Model(_) => "model",
        }
    }
}

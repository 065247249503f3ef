use crate::shared::frame::Frame;

use super::depth_map::DepthMap;

/// Domain interface for monocular depth estimation.
///
/// Takes an RGB frame of any size and returns a depth map at whatever
/// resolution the model produces; callers resize to their own target.
/// Implementations may hold a loaded model, hence `&mut self`.
pub trait DepthEstimator: Send {
    fn estimate(&mut self, frame: &Frame) -> Result<DepthMap, Box<dyn std::error::Error>>;
}

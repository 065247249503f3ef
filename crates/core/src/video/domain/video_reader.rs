use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sequential source of decoded RGB frames.
///
/// The render loop only sees [`Frame`] and [`VideoMetadata`]; container and
/// codec handling stay behind this trait.
pub trait VideoReader: Send {
    /// Opens the source and returns its metadata. `total_frames` is the
    /// container's estimate and may be 0.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Frames in decode order, indexed from 0. An `Err` item is a decode
    /// failure, not end of stream.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Safe to call more than once.
    fn close(&mut self);
}

use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sink for rendered frames, written to an intermediate container.
///
/// `metadata` passed to `open` carries the output dimensions and frame rate;
/// every written frame must match them.
pub trait VideoWriter: Send {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes the encoder and writes the trailer.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

use std::path::PathBuf;

/// Stream properties reported by a `VideoReader` and handed to a `VideoWriter`.
///
/// `total_frames` comes from the container header and may be an estimate;
/// it is 0 when the container does not record it.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Same stream, re-described at a different raster size.
    pub fn with_dimensions(&self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }
}

use crate::depth::domain::depth_map::DepthMap;
use crate::shared::constants::FLAT_DEPTH_EPSILON;
use crate::shared::frame::Frame;

use super::palette::Palette;

/// Turns a depth map into an 8-bit RGB frame.
///
/// Each frame is contrast-stretched on its own min/max, so absolute depth
/// is not comparable across frames. Flat maps render black.
pub struct DepthRenderer {
    palette: Palette,
    lut: Vec<[u8; 3]>,
}

impl DepthRenderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            lut: palette.lut(),
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Renders `depth` as frame number `index`.
    pub fn render(&self, depth: &DepthMap, index: usize) -> Frame {
        let intensities = normalize_to_u8(depth);
        let mut data = Vec::with_capacity(intensities.len() * 3);
        for v in intensities {
            data.extend_from_slice(&self.lut[v as usize]);
        }
        Frame::new(data, depth.width(), depth.height(), 3, index)
    }
}

/// Min-max normalizes to `0..=255`, row-major.
///
/// `round((v - min) / (max - min) * 255)`; a range at or below
/// `FLAT_DEPTH_EPSILON` yields all zeros.
pub fn normalize_to_u8(depth: &DepthMap) -> Vec<u8> {
    let Some((min, max)) = depth.min_max() else {
        return Vec::new();
    };
    let range = max - min;
    if range.is_nan() || range <= FLAT_DEPTH_EPSILON {
        return vec![0; depth.values().len()];
    }
    depth
        .values()
        .iter()
        .map(|&v| (((v - min) / range) * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect()
}

//! Depth Anything V2 estimator using ONNX Runtime via `ort`.
//!
//! Handles the model's image preprocessing (aspect-preserving resize to a
//! multiple of the ViT patch size, ImageNet normalization), inference, and
//! conversion of the predicted depth tensor into a [`DepthMap`].

use std::path::Path;

use crate::depth::domain::depth_estimator::DepthEstimator;
use crate::depth::domain::depth_map::DepthMap;
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

/// Base input resolution the Depth Anything processor targets.
const BASE_INPUT_SIZE: u32 = 518;

/// ViT patch size; both input sides must be a multiple of it.
const PATCH_SIZE: u32 = 14;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct OnnxDepthEstimator {
    session: ort::session::Session,
    fixed_input: Option<(u32, u32)>,
}

impl OnnxDepthEstimator {
    /// Load a depth ONNX model. The session lives as long as the estimator.
    ///
    /// If the model declares a static NCHW input shape it is used as-is;
    /// dynamic models get the aspect-preserving size per frame.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let fixed_input = session.inputs().first().and_then(|input| {
            if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                if shape.len() >= 4 && shape[2] > 0 && shape[3] > 0 {
                    Some((shape[3] as u32, shape[2] as u32))
                } else {
                    None
                }
            } else {
                None
            }
        });

        match fixed_input {
            Some((w, h)) => log::info!("Depth model input fixed at {w}x{h}"),
            None => log::info!("Depth model accepts dynamic input sizes"),
        }

        Ok(Self {
            session,
            fixed_input,
        })
    }
}

impl DepthEstimator for OnnxDepthEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<DepthMap, Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("expected RGB frame, got {} channels", frame.channels()).into());
        }
        if frame.width() == 0 || frame.height() == 0 {
            return Err("cannot estimate depth of an empty frame".into());
        }

        let (in_w, in_h) = self
            .fixed_input
            .unwrap_or_else(|| inference_size(frame.width(), frame.height(), BASE_INPUT_SIZE));
        let input_tensor = preprocess(frame, in_w, in_h)?;

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("depth model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();

        // [1, H, W] or [1, 1, H, W]; only the trailing two axes carry pixels.
        if shape.len() < 2 || shape[..shape.len() - 2].iter().any(|&d| d != 1) {
            return Err(format!("unexpected depth output shape: {shape:?}").into());
        }
        let out_h = shape[shape.len() - 2] as u32;
        let out_w = shape[shape.len() - 1] as u32;
        let values: Vec<f32> = tensor.iter().copied().collect();

        DepthMap::from_vec(out_w, out_h, values)
    }
}

/// Depth Anything resize rule: scale each side toward `base`, keep the
/// aspect ratio using whichever scale is closer to 1, then snap both sides
/// to the nearest multiple of the patch size.
pub(crate) fn inference_size(width: u32, height: u32, base: u32) -> (u32, u32) {
    let mut scale_w = base as f64 / width as f64;
    let mut scale_h = base as f64 / height as f64;
    if (1.0 - scale_w).abs() < (1.0 - scale_h).abs() {
        scale_h = scale_w;
    } else {
        scale_w = scale_h;
    }
    (
        snap_to_patch(width as f64 * scale_w),
        snap_to_patch(height as f64 * scale_h),
    )
}

fn snap_to_patch(value: f64) -> u32 {
    let snapped = (value / PATCH_SIZE as f64).round() as u32 * PATCH_SIZE;
    snapped.max(PATCH_SIZE)
}

/// Resize to `width` x `height` and normalize into an NCHW float tensor.
fn preprocess(
    frame: &Frame,
    width: u32,
    height: u32,
) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("Failed to create image from frame data")?;
    let resized = if img.dimensions() == (width, height) {
        img
    } else {
        image::imageops::resize(&img, width, height, image::imageops::FilterType::CatmullRom)
    };

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let v = pixel.0[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }
    Ok(tensor)
}

/// Depth Anything V2 ONNX exports, one per model size.
pub const DEPTH_MODEL_SMALL_NAME: &str = "depth_anything_v2_small.onnx";
pub const DEPTH_MODEL_SMALL_URL: &str =
    "https://huggingface.co/onnx-community/depth-anything-v2-small/resolve/main/onnx/model.onnx";

pub const DEPTH_MODEL_BASE_NAME: &str = "depth_anything_v2_base.onnx";
pub const DEPTH_MODEL_BASE_URL: &str =
    "https://huggingface.co/onnx-community/depth-anything-v2-base/resolve/main/onnx/model.onnx";

pub const DEPTH_MODEL_LARGE_NAME: &str = "depth_anything_v2_large.onnx";
pub const DEPTH_MODEL_LARGE_URL: &str =
    "https://huggingface.co/onnx-community/depth-anything-v2-large/resolve/main/onnx/model.onnx";

/// Default number of frames averaged by the temporal smoother.
pub const DEFAULT_SMOOTH_WINDOW: usize = 3;

/// Default output height in pixels.
pub const DEFAULT_TARGET_HEIGHT: u32 = 480;

/// Log progress every N frames.
pub const PROGRESS_LOG_INTERVAL: usize = 50;

/// Depth ranges narrower than this render as a flat (all-zero) frame.
pub const FLAT_DEPTH_EPSILON: f32 = 1e-6;

/// Final encode settings: H.264, visually lossless CRF, slow preset.
pub const FINAL_VIDEO_CODEC: &str = "libx264";
pub const FINAL_PIXEL_FORMAT: &str = "yuv420p";
pub const FINAL_CRF: u8 = 18;
pub const FINAL_PRESET: &str = "slow";

pub const DIRECT_DOWNLOAD_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Bit rate of the MPEG-4 intermediate. High enough that the final encode
/// is not fed visible artifacts.
pub const INTERMEDIATE_BIT_RATE: usize = 20_000_000;

/// Frame rate assumed when the source does not report one.
pub const FALLBACK_FPS: f64 = 30.0;

pub const YT_DLP_FORMAT: &str =
    "bestvideo[ext=mp4][height<=1080]+bestaudio[ext=m4a]/best[ext=mp4]/best";

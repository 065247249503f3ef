use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::shared::constants::{FINAL_CRF, FINAL_PIXEL_FORMAT, FINAL_PRESET, FINAL_VIDEO_CODEC};
use crate::shared::error::DepthVizError;
use crate::video::domain::video_finisher::VideoFinisher;

/// Re-encodes the intermediate to H.264 with an external `ffmpeg` process.
///
/// Any existing file at the output path is removed before encoding. The
/// intermediate is deleted only after the encoder exits successfully.
#[derive(Debug, Clone)]
pub struct FfmpegCliFinisher {
    program: PathBuf,
    crf: u8,
    preset: String,
}

impl FfmpegCliFinisher {
    /// Uses the `ffmpeg` found on `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            crf: FINAL_CRF,
            preset: FINAL_PRESET.to_string(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed to the encoder, in order.
    pub fn build_args(&self, intermediate: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            intermediate.to_string_lossy().to_string(),
            "-c:v".to_string(),
            FINAL_VIDEO_CODEC.to_string(),
            "-pix_fmt".to_string(),
            FINAL_PIXEL_FORMAT.to_string(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-preset".to_string(),
            self.preset.clone(),
            "-loglevel".to_string(),
            "error".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

impl Default for FfmpegCliFinisher {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoFinisher for FfmpegCliFinisher {
    fn finish(&self, intermediate: &Path, output: &Path) -> Result<PathBuf, DepthVizError> {
        if !intermediate.exists() {
            return Err(DepthVizError::Encode(format!(
                "intermediate {} does not exist",
                intermediate.display()
            )));
        }

        if output.exists() {
            std::fs::remove_file(output).map_err(|e| {
                DepthVizError::resource(
                    "encode",
                    format!("cannot replace {}: {e}", output.display()),
                )
            })?;
        }

        let args = self.build_args(intermediate, output);
        log::debug!("{} {}", self.program.display(), args.join(" "));

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                DepthVizError::Encode(format!(
                    "failed to run {}: {e}",
                    self.program.display()
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DepthVizError::Encode(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr.trim()
            )));
        }

        if let Err(e) = std::fs::remove_file(intermediate) {
            log::warn!(
                "Could not remove intermediate {}: {e}",
                intermediate.display()
            );
        }

        log::info!("Final video written to {}", output.display());
        Ok(output.to_path_buf())
    }
}

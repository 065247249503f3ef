use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::shared::constants::{DIRECT_DOWNLOAD_EXTENSIONS, YT_DLP_FORMAT};
use crate::shared::error::DepthVizError;
use crate::shared::model_resolver;

/// Turns a user-supplied input (local path or URL) into a local video file.
///
/// Direct links to video files are fetched over HTTP; every other URL,
/// and any direct link whose download fails, goes through `yt-dlp`.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    download_dir: PathBuf,
    yt_dlp: PathBuf,
}

impl SourceFetcher {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            yt_dlp: PathBuf::from("yt-dlp"),
        }
    }

    pub fn with_yt_dlp(mut self, program: impl Into<PathBuf>) -> Self {
        self.yt_dlp = program.into();
        self
    }

    pub fn resolve(&self, input: &str) -> Result<PathBuf, DepthVizError> {
        let local = Path::new(input);
        if local.is_file() {
            return Ok(local.to_path_buf());
        }
        if !is_url(input) {
            return Err(DepthVizError::acquisition(
                input,
                "no such file and not an http(s) URL",
            ));
        }

        std::fs::create_dir_all(&self.download_dir)
            .map_err(|e| DepthVizError::acquisition(input, e))?;
        let dest = self.download_dir.join(download_file_name());
        log::info!("Acquiring video from {input}");

        if is_direct_video_url(input) {
            match model_resolver::download(input, &dest, None) {
                Ok(()) => {
                    log::info!("Direct download saved to {}", dest.display());
                    return Ok(dest);
                }
                Err(e) => log::warn!("Direct download failed: {e}. Falling back to yt-dlp"),
            }
        }

        self.fetch_with_yt_dlp(input, &dest)
    }

    fn fetch_with_yt_dlp(&self, url: &str, dest: &Path) -> Result<PathBuf, DepthVizError> {
        let output = Command::new(&self.yt_dlp)
            .arg("-f")
            .arg(YT_DLP_FORMAT)
            .arg("--merge-output-format")
            .arg("mp4")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("-o")
            .arg(dest)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                DepthVizError::acquisition(
                    url,
                    format!("failed to run {}: {e}", self.yt_dlp.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DepthVizError::acquisition(
                url,
                format!("yt-dlp exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        if !dest.is_file() {
            return Err(DepthVizError::acquisition(
                url,
                format!("yt-dlp reported success but {} is missing", dest.display()),
            ));
        }

        log::info!("yt-dlp download saved to {}", dest.display());
        Ok(dest.to_path_buf())
    }
}

/// Convenience wrapper around [`SourceFetcher::resolve`] with the default
/// `yt-dlp` from `PATH`.
pub fn resolve_source(input: &str, download_dir: &Path) -> Result<PathBuf, DepthVizError> {
    SourceFetcher::new(download_dir).resolve(input)
}

pub fn is_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// True when the URL path ends in a container extension we can fetch
/// without a site extractor. Query strings and fragments are ignored.
pub fn is_direct_video_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    !ext.contains('/') && DIRECT_DOWNLOAD_EXTENSIONS.contains(&ext.as_str())
}

fn download_file_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("input_{secs}.mp4")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/clip.mp4", true)]
    #[case("HTTP://EXAMPLE.COM/CLIP.MOV", true)]
    #[case("https://example.com/clip.avi?token=abc", true)]
    #[case("https://example.com/clip.mkv", false)]
    #[case("https://www.youtube.com/watch?v=abc123", false)]
    #[case("https://example.com/videos.mp4/page", false)]
    fn test_is_direct_video_url(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_direct_video_url(url), expected);
    }

    #[rstest]
    #[case("https://example.com/a", true)]
    #[case("http://example.com/a", true)]
    #[case("ftp://example.com/a", false)]
    #[case("/tmp/video.mp4", false)]
    #[case("clip.mp4", false)]
    fn test_is_url(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_url(input), expected);
    }

    #[test]
    fn test_local_file_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("local.mp4");
        std::fs::write(&file, b"video").unwrap();

        let resolved = resolve_source(file.to_str().unwrap(), dir.path()).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn test_missing_local_file_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_source("/nonexistent/clip.mp4", dir.path()).unwrap_err();
        assert!(matches!(err, DepthVizError::Acquisition { .. }));
        assert_eq!(err.stage(), "acquisition");
    }

    #[test]
    fn test_missing_yt_dlp_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = SourceFetcher::new(dir.path()).with_yt_dlp("/nonexistent/bin/yt-dlp");
        let err = fetcher
            .resolve("https://www.youtube.com/watch?v=abc123")
            .unwrap_err();
        assert!(matches!(err, DepthVizError::Acquisition { .. }));
    }

    #[test]
    fn test_failed_direct_download_falls_back_to_yt_dlp() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = SourceFetcher::new(dir.path()).with_yt_dlp("/nonexistent/bin/yt-dlp");
        // Nothing listens on the discard port, so the direct fetch fails fast
        // and the error comes from the yt-dlp fallback.
        let err = fetcher.resolve("http://127.0.0.1:9/clip.mp4").unwrap_err();
        assert!(err.to_string().contains("yt-dlp"), "got: {err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_yt_dlp_failure_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = SourceFetcher::new(dir.path()).with_yt_dlp("false");
        let err = fetcher.resolve("https://example.com/watch").unwrap_err();
        assert!(matches!(err, DepthVizError::Acquisition { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_yt_dlp_success_without_file_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = SourceFetcher::new(dir.path()).with_yt_dlp("true");
        let err = fetcher.resolve("https://example.com/watch").unwrap_err();
        assert!(err.to_string().contains("missing"), "got: {err}");
    }

    #[test]
    fn test_download_file_name_shape() {
        let name = download_file_name();
        assert!(name.starts_with("input_"));
        assert!(name.ends_with(".mp4"));
    }
}

use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use super::constants::{
    DEPTH_MODEL_BASE_NAME, DEPTH_MODEL_BASE_URL, DEPTH_MODEL_LARGE_NAME, DEPTH_MODEL_LARGE_URL,
    DEPTH_MODEL_SMALL_NAME, DEPTH_MODEL_SMALL_URL,
};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server returned {status} for {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("failed to load model {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

/// Depth model variant. Only changes which weights are loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSize {
    Small,
    Base,
    Large,
}

impl ModelSize {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Small => DEPTH_MODEL_SMALL_NAME,
            Self::Base => DEPTH_MODEL_BASE_NAME,
            Self::Large => DEPTH_MODEL_LARGE_NAME,
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Self::Small => DEPTH_MODEL_SMALL_URL,
            Self::Base => DEPTH_MODEL_BASE_URL,
            Self::Large => DEPTH_MODEL_LARGE_URL,
        }
    }
}

impl FromStr for ModelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "base" => Ok(Self::Base),
            "large" => Ok(Self::Large),
            other => Err(format!(
                "model size must be one of: small, base, large, got '{other}'"
            )),
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Small => "small",
            Self::Base => "base",
            Self::Large => "large",
        };
        f.write_str(label)
    }
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve the ONNX file for a model size, downloading it on first use.
pub fn resolve_model(
    size: ModelSize,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve(size.file_name(), size.url(), bundled_dir, progress)
}

/// Resolve a model file by name, checking cache locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (for development / pre-packaged installs)
/// 3. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    resolve_in(&model_cache_dir()?, name, url, bundled_dir, progress)
}

fn resolve_in(
    cache_dir: &Path,
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        log::debug!("Using cached model {}", cached_path.display());
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            log::debug!("Using bundled model {}", bundled_path.display());
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/depthviz/models/`
/// - Linux: `$XDG_CACHE_HOME/depthviz/models/` or `~/.cache/depthviz/models/`
/// - Windows: `%LOCALAPPDATA%/depthviz/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("depthviz").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("depthviz").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

/// Fetches `url` into `dest` through a `.part` file so an interrupted
/// download never leaves a truncated file at `dest`.
///
/// The body is streamed in 1 MiB chunks and the transfer has no overall
/// timeout, so multi-gigabyte sources download in bounded memory.
pub fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let download_err = |e: reqwest::Error| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(None)
        .build()
        .map_err(download_err)?;
    let response = client.get(url).send().map_err(download_err)?;
    if !response.status().is_success() {
        return Err(ModelResolveError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    if let Err(e) = stream_body(response, &mut file, total, progress.as_ref()) {
        drop(file);
        let _ = fs::remove_file(&temp_path);
        return Err(ModelResolveError::Write {
            path: temp_path,
            source: e,
        });
    }
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn stream_body(
    mut reader: impl Read,
    file: &mut fs::File,
    total: u64,
    progress: Option<&ProgressFn>,
) -> std::io::Result<u64> {
    let mut buf = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        downloaded += n as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush()?;
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_cache() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled = tmp.path().join("bundled");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&bundled).unwrap();
        fs::write(cache.join("m.onnx"), b"cached").unwrap();
        fs::write(bundled.join("m.onnx"), b"bundled").unwrap();

        let path = resolve_in(&cache, "m.onnx", "http://invalid.example/m", Some(&bundled), None)
            .unwrap();
        assert_eq!(path, cache.join("m.onnx"));
    }

    #[test]
    fn test_resolve_falls_back_to_bundled() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled = tmp.path().join("bundled");
        fs::create_dir_all(&bundled).unwrap();
        fs::write(bundled.join("m.onnx"), b"bundled").unwrap();

        let path = resolve_in(&cache, "m.onnx", "http://invalid.example/m", Some(&bundled), None)
            .unwrap();
        assert_eq!(path, bundled.join("m.onnx"));
        assert!(!cache.join("m.onnx").exists());
    }

    #[test]
    fn test_resolve_download_failure_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let result = resolve_in(
            &cache,
            "m.onnx",
            "http://invalid.nonexistent.example.com/m.onnx",
            None,
            None,
        );
        assert!(result.is_err());
        assert!(!cache.join("m.onnx").exists());
        assert!(!cache.join("m.part").exists());
    }

    /// Serves one canned HTTP response on a loopback port.
    fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let header = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
        });
        format!("http://{addr}/clip.mp4")
    }

    #[test]
    fn test_download_streams_body_with_progress() {
        let body: Vec<u8> = (0..(5 * 1024 * 1024 / 2)).map(|i| (i % 251) as u8).collect();
        let url = serve_once("200 OK", body.clone());
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("clip.mp4");

        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        download(
            &url,
            &dest,
            Some(Box::new(move |done: u64, total: u64| {
                seen.lock().unwrap().push((done, total))
            })),
        )
        .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), body);
        assert!(!tmp.path().join("clip.part").exists());
        let calls = calls.lock().unwrap();
        assert!(calls.len() >= 3, "progress reported {} times", calls.len());
        assert!(calls.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(*calls.last().unwrap(), (body.len() as u64, body.len() as u64));
    }

    #[test]
    fn test_download_http_error_writes_nothing() {
        let url = serve_once("404 Not Found", b"missing".to_vec());
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("clip.mp4");

        let result = download(&url, &dest, None);
        assert!(matches!(
            result,
            Err(ModelResolveError::HttpStatus { status: 404, .. })
        ));
        assert!(!dest.exists());
        assert!(!tmp.path().join("clip.part").exists());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("depthviz"));
        assert!(path.ends_with("models"));
    }

    #[rstest]
    #[case("small", ModelSize::Small)]
    #[case("Base", ModelSize::Base)]
    #[case("LARGE", ModelSize::Large)]
    fn test_model_size_parses(#[case] input: &str, #[case] expected: ModelSize) {
        assert_eq!(input.parse::<ModelSize>().unwrap(), expected);
    }

    #[test]
    fn test_model_size_rejects_unknown() {
        assert!("giant".parse::<ModelSize>().is_err());
    }

    #[test]
    fn test_model_sizes_map_to_distinct_files() {
        let names = [ModelSize::Small, ModelSize::Base, ModelSize::Large].map(|s| s.file_name());
        assert_ne!(names[0], names[1]);
        assert_ne!(names[1], names[2]);
        assert!(ModelSize::Base.url().contains("base"));
        assert_eq!(ModelSize::Large.to_string(), "large");
    }
}

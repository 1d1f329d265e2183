//! Asset Fetcher: streams remote media into the job workspace.

use futures::StreamExt;
use reel_models::{MediaAsset, MediaKind};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::remove_if_exists;
use crate::sniff::verify_asset;

/// Browser identity; several file hosts refuse obvious bots.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Fetcher limits.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout, body included
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    /// Smallest narration payload accepted
    pub min_audio_bytes: u64,
    /// Smallest background payload accepted
    pub min_video_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(45),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            min_audio_bytes: 1024,
            min_video_bytes: 16 * 1024,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn min_bytes(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Audio => self.min_audio_bytes,
            MediaKind::Video => self.min_video_bytes,
        }
    }
}

/// Downloads and verifies media assets.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    client: Client,
    config: FetchConfig,
}

impl AssetFetcher {
    pub fn new(config: FetchConfig) -> MediaResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| MediaError::fetch_failed("<client>", format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `uri` to `destination`.
    ///
    /// Bytes are streamed to `<destination>.part` and renamed once complete,
    /// so a failed fetch leaves any earlier file at `destination` untouched.
    /// The returned asset is not yet verified.
    pub async fn fetch(&self, uri: &str, destination: &Path, kind: MediaKind) -> MediaResult<MediaAsset> {
        let url = Url::parse(uri).map_err(|e| MediaError::fetch_failed(uri, format!("invalid URI: {e}")))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        let partial = partial_path(destination);
        let started = Instant::now();

        let written = match url.scheme() {
            "http" | "https" => self.stream_to(uri, &partial).await,
            "file" => copy_local(uri, &url, &partial).await,
            other => Err(MediaError::fetch_failed(uri, format!("unsupported scheme '{other}'"))),
        };

        let written = match written {
            Ok(n) => n,
            Err(e) => {
                remove_if_exists(&partial).await;
                return Err(e);
            }
        };

        let min_bytes = self.config.min_bytes(kind);
        if written < min_bytes {
            remove_if_exists(&partial).await;
            let reason = if written == 0 {
                "empty response body".to_string()
            } else {
                format!("received {written} bytes, below the {min_bytes} byte minimum for {kind}")
            };
            warn!(uri, kind = kind.as_str(), bytes = written, "rejecting undersized download");
            return Err(MediaError::fetch_failed(uri, reason));
        }

        fs::rename(&partial, destination).await?;

        info!(
            uri,
            kind = kind.as_str(),
            bytes = written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "asset fetched"
        );

        Ok(MediaAsset::new(kind, uri, destination).with_byte_size(written))
    }

    /// Sniff the asset and return its verified form.
    pub async fn verify(&self, asset: MediaAsset) -> MediaResult<MediaAsset> {
        let min_bytes = self.config.min_bytes(asset.kind());
        verify_asset(asset, min_bytes).await
    }

    async fn stream_to(&self, uri: &str, partial: &Path) -> MediaResult<u64> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| describe_transport_error(uri, &e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::fetch_failed(uri, format!("HTTP {status}")));
        }
        debug!(uri, final_url = %response.url(), "streaming response body");

        let mut file = fs::File::create(partial).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| describe_transport_error(uri, &e, self.config.timeout))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

async fn copy_local(uri: &str, url: &Url, partial: &Path) -> MediaResult<u64> {
    let source = url
        .to_file_path()
        .map_err(|_| MediaError::fetch_failed(uri, "invalid file URI"))?;
    fs::copy(&source, partial)
        .await
        .map_err(|e| MediaError::fetch_failed(uri, format!("cannot read {}: {e}", source.display())))
}

fn describe_transport_error(uri: &str, err: &reqwest::Error, timeout: Duration) -> MediaError {
    if err.is_timeout() {
        MediaError::fetch_failed(uri, format!("timed out after {}s", timeout.as_secs()))
    } else if err.is_redirect() {
        MediaError::fetch_failed(uri, "too many redirects")
    } else if err.is_connect() {
        MediaError::fetch_failed(uri, format!("connection failed: {err}"))
    } else {
        MediaError::fetch_failed(uri, err.to_string())
    }
}

/// `voice.mp3` -> `voice.mp3.part`
fn partial_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

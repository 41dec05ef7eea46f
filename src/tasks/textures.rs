use std::future::Future;
use std::path::Path;

use image::RgbaImage;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TextureConfig;
use crate::error::FetchError;
use crate::events::TexturesReady;
use crate::processing::raster::{TextureSet, resample_rgba};

/// Where texture bytes come from.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Sent on every HTTP request; image hosts such as Wikimedia reject
/// anonymous clients.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client builder with the crate's `User-Agent` already set.
pub fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder().user_agent(USER_AGENT)
}

/// HTTP(S) via `reqwest`; `file://` URLs and bare paths are read from disk.
#[derive(Debug, Clone)]
pub struct NetworkSource {
    client: reqwest::Client,
}

impl NetworkSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_default_client() -> Result<Self, reqwest::Error> {
        Ok(Self::new(client_builder().build()?))
    }
}

fn local_path(url: &str) -> Option<&Path> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(Path::new(rest));
    }
    if url.contains("://") {
        None
    } else {
        Some(Path::new(url))
    }
}

impl ImageSource for NetworkSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(path) = local_path(url) {
            return tokio::fs::read(path).await.map_err(|source| FetchError::Io {
                url: url.to_string(),
                source,
            });
        }

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(transport)?;
        debug!(url, len = bytes.len(), "fetched texture source");
        Ok(bytes.to_vec())
    }
}

fn decode_to(url: &str, bytes: &[u8], width: u32, height: u32) -> Result<RgbaImage, FetchError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?
        .to_rgba8();
    resample_rgba(&decoded, width, height).map_err(|err| FetchError::Resample {
        url: url.to_string(),
        reason: format!("{err:#}"),
    })
}

/// Fetches both photographs concurrently and derives the full set.
///
/// Either failure fails the whole load; nothing partial is returned.
pub async fn try_load<S: ImageSource>(
    source: &S,
    cfg: &TextureConfig,
) -> Result<TextureSet, FetchError> {
    let (diffuse_bytes, clouds_bytes) = tokio::try_join!(
        source.fetch(&cfg.diffuse_url),
        source.fetch(&cfg.clouds_url)
    )?;

    let diffuse_url = cfg.diffuse_url.clone();
    let clouds_url = cfg.clouds_url.clone();
    let (width, height) = (cfg.width, cfg.height);
    tokio::task::spawn_blocking(move || -> Result<TextureSet, FetchError> {
        let diffuse = decode_to(&diffuse_url, &diffuse_bytes, width, height)?;
        let clouds = decode_to(&clouds_url, &clouds_bytes, width, height)?;
        Ok(TextureSet::derive(diffuse, &clouds))
    })
    .await?
}

/// Like [`try_load`], but any failure yields the flat fallback set.
pub async fn load<S: ImageSource>(source: &S, cfg: &TextureConfig) -> TextureSet {
    match try_load(source, cfg).await {
        Ok(set) => {
            let (width, height) = set.dimensions();
            info!(width, height, "derived globe textures");
            set
        }
        Err(err) => {
            warn!(
                url = err.url().unwrap_or("-"),
                error = %err,
                "texture load failed; using flat fallback"
            );
            TextureSet::flat(cfg.fallback_width, cfg.fallback_height, cfg.fallback_color)
        }
    }
}

/// Loads once and hands the result to `deliver`.
///
/// There is no timeout: a stalled fetch leaves the set undelivered until
/// `cancel` fires.
pub async fn run<S: ImageSource>(
    source: S,
    cfg: TextureConfig,
    deliver: oneshot::Sender<TexturesReady>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let set = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("cancel received before textures were ready");
            return Ok(());
        }
        set = load(&source, &cfg) => set,
    };
    if deliver.send(TexturesReady(set)).is_err() {
        debug!("texture receiver dropped before delivery");
    }
    Ok(())
}

use thiserror::Error;

/// Failure to turn one texture source URL into a decoded raster.
///
/// These never reach the presentation layer; the texture task swaps in the
/// flat fallback set instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("request for {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection, TLS or body transfer error.
    #[error("transport error fetching {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Local (`file://` or bare path) source could not be read.
    #[error("failed to read {url}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Bytes arrived but are not a decodable image.
    #[error("failed to decode image from {url}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    /// Resampling to the pipeline size failed.
    #[error("failed to resample {url}: {reason}")]
    Resample { url: String, reason: String },

    /// The blocking decode worker panicked or was cancelled.
    #[error("decode worker failed")]
    Join(#[from] tokio::task::JoinError),
}

impl FetchError {
    /// Source URL this failure belongs to, when known.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Status { url, .. }
            | Self::Transport { url, .. }
            | Self::Io { url, .. }
            | Self::Decode { url, .. }
            | Self::Resample { url, .. } => Some(url),
            Self::Join(_) => None,
        }
    }
}

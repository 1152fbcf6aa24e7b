use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{DescriptorStore, DescriptorUpdate, Generation};
use crate::config::ArtworkConfig;
use crate::services::platform::Artwork;

/// Reasons a cover image could not be loaded
#[derive(thiserror::Error, Debug)]
pub enum ArtworkError {
    /// The cover URL could not be parsed or uses an unsupported scheme
    #[error("Invalid artwork URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as given
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The request failed before a response arrived
    #[error("Artwork request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Artwork request returned HTTP {0}")]
    Status(u16),

    /// The response exceeded the configured size limit
    #[error("Artwork is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Reported or received size
        size: u64,
        /// Configured limit
        limit: usize,
    },

    /// The response body was empty
    #[error("Artwork response was empty")]
    Empty,

    /// The body is not a decodable image
    #[error("Artwork could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    /// The decoding task panicked or was cancelled
    #[error("Artwork decoding task failed: {0}")]
    DecodeTask(#[from] tokio::task::JoinError),
}

/// Fetches a cover image.
#[async_trait]
pub trait ArtworkFetcher: Send + Sync {
    /// Fetch and decode the image at `url`.
    ///
    /// # Errors
    ///
    /// Returns an `ArtworkError` describing why no image is available.
    async fn fetch(&self, url: &str) -> Result<Artwork, ArtworkError>;
}

/// Fetches cover images over HTTP(S).
pub struct HttpArtworkFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpArtworkFetcher {
    /// Build a fetcher from the artwork configuration.
    ///
    /// # Errors
    ///
    /// Returns `ArtworkError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ArtworkConfig) -> Result<Self, ArtworkError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self::with_client(builder.build()?, config.max_bytes))
    }

    pub(super) fn with_client(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }

    fn parse_url(url: &str) -> Result<Url, ArtworkError> {
        let parsed = Url::parse(url).map_err(|e| ArtworkError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ArtworkError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{scheme}'"),
            }),
        }
    }

    fn check_size(&self, size: u64) -> Result<(), ArtworkError> {
        if size > self.max_bytes as u64 {
            return Err(ArtworkError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch(&self, url: &str) -> Result<Artwork, ArtworkError> {
        let parsed = Self::parse_url(url)?;

        let mut response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkError::Status(status.as_u16()));
        }
        if let Some(length) = response.content_length() {
            self.check_size(length)?;
        }

        // Content-Length may be absent or wrong, so the limit is enforced
        // on what actually arrives.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            self.check_size((body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
        }
        if body.is_empty() {
            return Err(ArtworkError::Empty);
        }

        let (width, height, body) = decode(body).await?;
        Ok(Artwork::new(url, width, height, body))
    }
}

/// Decode `body` on the blocking pool and return its dimensions with it.
async fn decode(body: Vec<u8>) -> Result<(u32, u32, Vec<u8>), ArtworkError> {
    tokio::task::spawn_blocking(move || {
        let image = image::load_from_memory(&body)?;
        Ok((image.width(), image.height(), body))
    })
    .await?
}

/// Loads artwork in the background and merges it into the store.
///
/// Loads are fire-and-forget: no retry, no cancellation. A result is only
/// merged if the store's generation has not moved since the load started.
#[derive(Clone)]
pub struct ArtworkLoader {
    fetcher: Option<Arc<dyn ArtworkFetcher>>,
    store: DescriptorStore,
    in_flight: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ArtworkLoader {
    /// Create a loader; `None` disables artwork entirely.
    pub fn new(fetcher: Option<Arc<dyn ArtworkFetcher>>, store: DescriptorStore) -> Self {
        Self {
            fetcher,
            store,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Start loading `url` for the descriptor at `generation`.
    ///
    /// Empty URLs are ignored. Must be called within a tokio runtime.
    pub fn load(&self, url: &str, generation: Generation) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        let Some(fetcher) = self.fetcher.clone() else {
            debug!(url, "Artwork loading disabled");
            return;
        };

        let store = self.store.clone();
        let url = url.to_string();
        let handle = tokio::spawn(async move {
            match fetcher.fetch(&url).await {
                Ok(artwork) => {
                    debug!(url, ?artwork, "Artwork loaded");
                    let update = DescriptorUpdate::new().artwork(Some(artwork));
                    if store.apply_if_current(generation, update).is_none() {
                        debug!(url, "Discarding artwork for a superseded descriptor");
                    }
                }
                Err(e) => warn!(url, "Failed to load artwork: {e}"),
            }
        });

        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Wait for the most recently started load to finish.
    pub async fn settled(&self) {
        let handle = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Artwork task ended abnormally: {e}");
            }
        }
    }
}

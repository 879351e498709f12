use crate::config::Config;
use crate::core::{LookupMode, MetadataSource, VideoMetadata};
use crate::download::get_http_client;
use crate::error::{LookupError, Result};

pub mod core;
pub mod live;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use self::core::DirectExtraction;
pub use live::LiveLookup;
pub use utils::{VideoId, extract_id, is_valid, matched_shape};

/// Resolves a URL and looks its metadata up through one configured source
pub struct Fetcher {
    source: Box<dyn MetadataSource>,
}

impl Fetcher {
    /// Build the source selected by `config.mode`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = get_http_client(&config.user_agent)?;
        let source: Box<dyn MetadataSource> = match config.mode {
            LookupMode::Live => Box::new(LiveLookup::new(
                client,
                &config.oembed_endpoint,
                &config.download_service,
            )),
            LookupMode::Direct => Box::new(DirectExtraction::new(client, &config.watch_base)),
        };
        Ok(Self { source })
    }

    /// Use a caller-provided source, e.g. another extraction backend
    pub fn with_source(source: impl MetadataSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn mode(&self) -> LookupMode {
        self.source.mode()
    }

    /// Validate `url`, then fetch title and formats.
    ///
    /// Invalid URLs fail with [`LookupError::InvalidUrl`] before any request
    /// is made.
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        let id = extract_id(url).ok_or_else(|| LookupError::InvalidUrl(url.to_string()))?;
        tracing::debug!(
            id = %id,
            shape = matched_shape(url).unwrap_or("unknown"),
            mode = %self.mode(),
            "resolved video id"
        );

        match self.source.lookup(&id).await {
            Ok(metadata) => {
                tracing::info!(
                    id = %id,
                    title = %metadata.title(),
                    formats = metadata.formats().len(),
                    "fetched video info"
                );
                Ok(metadata)
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "error fetching video info");
                Err(e)
            }
        }
    }
}

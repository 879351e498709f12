pub mod config;
pub mod core;
mod download;
pub mod error;
pub mod youtube;

pub use crate::config::Config;
pub use crate::core::{Container, FormatDescriptor, LookupMode, MetadataSource, VideoMetadata};
pub use crate::youtube::{Fetcher, VideoId, extract_id, is_valid};
use error::Result;
pub use error::{LookupError, LookupErrorKind, SourceError};
use reqwest::header::HeaderMap;

/// Look up title and formats for `url` using the source `config` selects.
///
/// The URL is checked before the config is used, so an invalid URL is
/// reported as [`LookupError::InvalidUrl`] even when the config is broken.
pub async fn fetch_metadata(url: &str, config: &Config) -> Result<VideoMetadata> {
    if !is_valid(url) {
        return Err(LookupError::InvalidUrl(url.to_string()));
    }
    Fetcher::from_config(config)?.fetch_metadata(url).await
}

/// Fetch the bytes behind a chosen format
pub async fn download_format(format: &FormatDescriptor, config: &Config) -> Result<Vec<u8>> {
    let client = download::get_http_client(&config.user_agent)?;
    let binary = download::download_binary(&client, &format.url, HeaderMap::new()).await?;
    tracing::info!(
        quality = %format.quality,
        container = %format.container,
        bytes = binary.len(),
        "downloaded format"
    );
    Ok(binary)
}

use reqwest::header::HeaderMap;
use url::Url;

use crate::core::{Container, FormatDescriptor, LookupMode, MetadataSource, VideoMetadata};
use crate::download::download_json;
use crate::error::{Result, SourceError};
use crate::youtube::types::OEmbedResponse;
use crate::youtube::utils::VideoId;

pub const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";
pub const DOWNLOAD_SERVICE: &str = "https://video-audio-forge.vercel.app/download";

/// Video resolutions offered in live mode, as (label, service value)
pub const VIDEO_QUALITIES: &[(&str, &str)] = &[
    ("360p", "360"),
    ("480p", "480"),
    ("720p", "720"),
    ("1080p", "1080"),
];

/// Audio bitrates offered in live mode, as (label, service value)
pub const AUDIO_QUALITIES: &[(&str, &str)] = &[
    ("128kbps", "128"),
    ("192kbps", "192"),
    ("256kbps", "256"),
    ("320kbps", "320"),
];

/// Live lookup: title from an oEmbed endpoint, formats synthesized on the
/// companion download service.
#[derive(Debug, Clone)]
pub struct LiveLookup {
    client: reqwest::Client,
    oembed_endpoint: String,
    download_service: String,
}

impl LiveLookup {
    pub fn new(
        client: reqwest::Client,
        oembed_endpoint: impl Into<String>,
        download_service: impl Into<String>,
    ) -> Self {
        Self {
            client,
            oembed_endpoint: oembed_endpoint.into(),
            download_service: download_service.into(),
        }
    }

    fn oembed_url(&self, id: &VideoId) -> Result<String> {
        let url = Url::parse_with_params(
            &self.oembed_endpoint,
            &[("url", id.watch_url().as_str()), ("format", "json")],
        )
        .map_err(|e| SourceError::Parse(format!("Invalid oEmbed endpoint: {}", e)))?;
        Ok(url.to_string())
    }

    /// Fetch the title reported by the oEmbed endpoint
    pub async fn fetch_title(&self, id: &VideoId) -> Result<String> {
        let url = self.oembed_url(id)?;
        let oembed: OEmbedResponse = download_json(&self.client, &url, HeaderMap::new()).await?;
        Ok(oembed.title)
    }

    /// The fixed catalog: four mp4 resolutions then four mp3 bitrates.
    pub fn catalog(&self, id: &VideoId) -> Result<Vec<FormatDescriptor>> {
        let video = VIDEO_QUALITIES
            .iter()
            .map(|(label, value)| self.descriptor(id, Container::Mp4, label, value));
        let audio = AUDIO_QUALITIES
            .iter()
            .map(|(label, value)| self.descriptor(id, Container::Mp3, label, value));
        video.chain(audio).collect()
    }

    fn descriptor(
        &self,
        id: &VideoId,
        container: Container,
        label: &str,
        value: &str,
    ) -> Result<FormatDescriptor> {
        // Appends to any query the service URL already carries
        let url = Url::parse_with_params(
            &self.download_service,
            &[
                ("videoId", id.as_str()),
                ("format", container.as_str()),
                ("quality", value),
            ],
        )
        .map_err(|e| SourceError::Parse(format!("Invalid download service: {}", e)))?;
        let format = FormatDescriptor::new(label, container, url.to_string());
        let display = format.label();
        Ok(format.with_label(display))
    }
}

#[async_trait::async_trait]
impl MetadataSource for LiveLookup {
    async fn lookup(&self, id: &VideoId) -> Result<VideoMetadata> {
        let title = self.fetch_title(id).await?;
        let formats = self.catalog(id)?;
        Ok(VideoMetadata::new(id.clone(), title, formats))
    }

    fn mode(&self) -> LookupMode {
        LookupMode::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{DEFAULT_USER_AGENT, get_http_client};
    use crate::youtube::extract_id;

    fn lookup() -> LiveLookup {
        LiveLookup::new(
            get_http_client(DEFAULT_USER_AGENT).unwrap(),
            OEMBED_ENDPOINT,
            DOWNLOAD_SERVICE,
        )
    }

    #[test]
    fn catalog_covers_all_points() {
        let id = extract_id("https://youtu.be/abcdefghijk").unwrap();
        let formats = lookup().catalog(&id).unwrap();
        assert_eq!(formats.len(), 8);

        let pairs: Vec<_> = formats
            .iter()
            .map(|f| (f.container, f.quality.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Container::Mp4, "360p"),
                (Container::Mp4, "480p"),
                (Container::Mp4, "720p"),
                (Container::Mp4, "1080p"),
                (Container::Mp3, "128kbps"),
                (Container::Mp3, "192kbps"),
                (Container::Mp3, "256kbps"),
                (Container::Mp3, "320kbps"),
            ]
        );
        for f in &formats {
            assert!(f.url.contains("abcdefghijk"), "{}", f.url);
            assert!(Url::parse(&f.url).is_ok());
        }
    }

    #[test]
    fn catalog_urls_and_labels() {
        let id = extract_id("https://youtu.be/abcdefghijk").unwrap();
        let formats = lookup().catalog(&id).unwrap();
        assert_eq!(
            formats[2].url,
            "https://video-audio-forge.vercel.app/download?videoId=abcdefghijk&format=mp4&quality=720"
        );
        assert_eq!(formats[2].label.as_deref(), Some("720p (MP4)"));
        assert_eq!(
            formats[5].url,
            "https://video-audio-forge.vercel.app/download?videoId=abcdefghijk&format=mp3&quality=192"
        );
        assert_eq!(formats[5].label(), "192kbps (MP3)");
    }

    #[test]
    fn catalog_keeps_existing_service_query() {
        let id = extract_id("https://youtu.be/abcdefghijk").unwrap();
        let live = LiveLookup::new(
            get_http_client(DEFAULT_USER_AGENT).unwrap(),
            OEMBED_ENDPOINT,
            "https://dl.example.org/get?key=1",
        );
        let formats = live.catalog(&id).unwrap();
        assert_eq!(
            formats[0].url,
            "https://dl.example.org/get?key=1&videoId=abcdefghijk&format=mp4&quality=360"
        );
        for f in &formats {
            let url = Url::parse(&f.url).unwrap();
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            assert_eq!(pairs[0], ("key".to_string(), "1".to_string()));
            assert!(pairs.contains(&("videoId".to_string(), "abcdefghijk".to_string())));
        }
    }

    #[test]
    fn bad_download_service_is_fetch_failure() {
        let id = extract_id("https://youtu.be/abcdefghijk").unwrap();
        let live = LiveLookup::new(
            get_http_client(DEFAULT_USER_AGENT).unwrap(),
            OEMBED_ENDPOINT,
            "not a url",
        );
        let err = live.catalog(&id).unwrap_err();
        assert_eq!(err.kind(), crate::error::LookupErrorKind::FetchFailed);
    }

    #[test]
    fn oembed_url_encodes_watch_url() {
        let id = extract_id("https://youtu.be/abcdefghijk").unwrap();
        let url = lookup().oembed_url(&id).unwrap();
        assert_eq!(
            url,
            "https://www.youtube.com/oembed?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabcdefghijk&format=json"
        );
    }

    #[test]
    fn bad_endpoint_is_fetch_failure() {
        let id = extract_id("https://youtu.be/abcdefghijk").unwrap();
        let live = LiveLookup::new(
            get_http_client(DEFAULT_USER_AGENT).unwrap(),
            "not a url",
            DOWNLOAD_SERVICE,
        );
        let err = live.oembed_url(&id).unwrap_err();
        assert_eq!(err.kind(), crate::error::LookupErrorKind::FetchFailed);
    }
}

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

use crate::core::{Container, FormatDescriptor, LookupMode, MetadataSource, VideoMetadata};
use crate::download::download_text;
use crate::error::{Result, SourceError};
use crate::youtube::types::{Format, PlayerResponse};
use crate::youtube::utils::{VideoId, build_watch_url};

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

/// Direct extraction: title and real stream URLs from the watch page's
/// embedded player response.
#[derive(Debug, Clone)]
pub struct DirectExtraction {
    client: reqwest::Client,
    watch_base: String,
}

impl DirectExtraction {
    pub fn new(client: reqwest::Client, watch_base: impl Into<String>) -> Self {
        Self {
            client,
            watch_base: watch_base.into(),
        }
    }

    /// Fetch video page HTML
    pub async fn fetch_video_page(&self, id: &VideoId) -> Result<String> {
        let url = build_watch_url(&self.watch_base, id);
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("CONSENT=YES+cb; SOCS=CAI"));
        Ok(download_text(&self.client, &url, headers).await?)
    }
}

#[async_trait::async_trait]
impl MetadataSource for DirectExtraction {
    async fn lookup(&self, id: &VideoId) -> Result<VideoMetadata> {
        let html = self.fetch_video_page(id).await?;
        let player_response = parse_player_response_from_html(&html)?;
        let title = player_response
            .video_details
            .as_ref()
            .and_then(|d| d.title.clone())
            .ok_or_else(|| SourceError::Parse("videoDetails.title missing".to_string()))?;

        let formats = extract_formats(&player_response);
        if formats.is_empty() {
            return Err(SourceError::NoPlayableFormats.into());
        }
        Ok(VideoMetadata::new(id.clone(), title, formats))
    }

    fn mode(&self) -> LookupMode {
        LookupMode::Direct
    }
}

/// Extract player response from HTML
pub fn parse_player_response_from_html(html: &str) -> Result<PlayerResponse> {
    let st_index = html.find(PLAYER_RESPONSE_MARKER).ok_or_else(|| {
        SourceError::Parse("ytInitialPlayerResponse not found".to_string())
    })? + PLAYER_RESPONSE_MARKER.len();

    let json = balanced_object(&html[st_index..]).ok_or_else(|| {
        SourceError::Parse("ytInitialPlayerResponse end not found".to_string())
    })?;

    let player_response = serde_json::from_str(json).map_err(|e| {
        SourceError::Parse(format!("Failed to parse player response JSON: {}", e))
    })?;
    Ok(player_response)
}

/// The leading `{...}` of `s`, skipping braces inside JSON strings
fn balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalize muxed then adaptive formats, skipping unusable entries
pub fn extract_formats(player_response: &PlayerResponse) -> Vec<FormatDescriptor> {
    let Some(streaming_data) = &player_response.streaming_data else {
        return Vec::new();
    };
    streaming_data
        .formats
        .iter()
        .chain(streaming_data.adaptive_formats.iter())
        .filter_map(normalize_format)
        .collect()
}

fn normalize_format(format: &Format) -> Option<FormatDescriptor> {
    let Some(url) = &format.url else {
        tracing::debug!(
            itag = format.itag,
            ciphered = format.signature_cipher.is_some(),
            "skipping format without plain url"
        );
        return None;
    };
    let Some(container) = Container::from_mime(&format.mime_type) else {
        tracing::debug!(itag = format.itag, mime = %format.mime_type, "skipping unknown container");
        return None;
    };

    let quality = if format.mime_type.starts_with("audio/") {
        format.bitrate.map(|b| format!("{}kbps", b.saturating_add(500) / 1000))
    } else {
        format.quality_label.clone()
    };
    let Some(quality) = quality else {
        tracing::debug!(itag = format.itag, "skipping format without quality");
        return None;
    };

    Some(FormatDescriptor::new(quality, container, url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {"videoDetails":{"videoId":"dQw4w9WgXcQ","title":"Never {Gonna} \"Give\" You Up"},"streamingData":{"formats":[{"itag":18,"mimeType":"video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"","qualityLabel":"360p","bitrate":503000,"url":"https://rr1.example/videoplayback?itag=18"}],"adaptiveFormats":[{"itag":137,"mimeType":"video/mp4; codecs=\"avc1.640028\"","qualityLabel":"1080p","bitrate":4000000,"signatureCipher":"s=abc&url=https%3A%2F%2Frr1.example"},{"itag":248,"mimeType":"video/webm; codecs=\"vp9\"","qualityLabel":"1080p","bitrate":2600000,"url":"https://rr1.example/videoplayback?itag=248"},{"itag":140,"mimeType":"audio/mp4; codecs=\"mp4a.40.2\"","bitrate":130685,"url":"https://rr1.example/videoplayback?itag=140"},{"itag":251,"mimeType":"audio/webm; codecs=\"opus\"","bitrate":141000,"url":"https://rr1.example/videoplayback?itag=251"},{"itag":599,"mimeType":"audio/3gpp","bitrate":30000,"url":"https://rr1.example/videoplayback?itag=599"}]}};var meta = {};</script></html>"#;

    #[test]
    fn parses_player_response() {
        let pr = parse_player_response_from_html(PAGE).unwrap();
        let details = pr.video_details.as_ref().unwrap();
        assert_eq!(details.video_id, "dQw4w9WgXcQ");
        assert_eq!(
            details.title.as_deref(),
            Some(r#"Never {Gonna} "Give" You Up"#)
        );
        assert_eq!(pr.streaming_data.as_ref().unwrap().adaptive_formats.len(), 5);
    }

    #[test]
    fn normalizes_formats_in_source_order() {
        let pr = parse_player_response_from_html(PAGE).unwrap();
        let formats = extract_formats(&pr);
        let got: Vec<_> = formats
            .iter()
            .map(|f| (f.container, f.quality.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Container::Mp4, "360p"),
                (Container::Webm, "1080p"),
                (Container::M4a, "131kbps"),
                (Container::Webm, "141kbps"),
            ]
        );
        assert_eq!(formats[0].url, "https://rr1.example/videoplayback?itag=18");
        assert_eq!(formats[0].label(), "360p (MP4)");
    }

    #[test]
    fn missing_player_response() {
        let err = parse_player_response_from_html("<html></html>").unwrap_err();
        assert_eq!(err.kind(), crate::error::LookupErrorKind::FetchFailed);

        let err = parse_player_response_from_html("ytInitialPlayerResponse = {\"a\":").unwrap_err();
        assert!(err.to_string().contains("end not found"));
    }

    #[test]
    fn no_streaming_data_yields_nothing() {
        let pr = parse_player_response_from_html(
            r#"ytInitialPlayerResponse = {"videoDetails":{"videoId":"x","title":"t"}};"#,
        )
        .unwrap();
        assert!(extract_formats(&pr).is_empty());
    }

    #[test]
    fn huge_audio_bitrate_does_not_overflow() {
        let pr = parse_player_response_from_html(
            r#"ytInitialPlayerResponse = {"streamingData":{"adaptiveFormats":[{"itag":140,"mimeType":"audio/mp4","bitrate":18446744073709551615,"url":"https://rr1.example/a"}]}};"#,
        )
        .unwrap();
        let formats = extract_formats(&pr);
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].quality, "18446744073709551kbps");
    }

    #[test]
    fn balanced_object_handles_escapes() {
        assert_eq!(balanced_object(r#"{"a":"\"}"}rest"#), Some(r#"{"a":"\"}"}"#));
        assert_eq!(balanced_object(r#"{"a":{"b":1}};x"#), Some(r#"{"a":{"b":1}}"#));
        assert_eq!(balanced_object("nope"), None);
    }
}

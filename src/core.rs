use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
pub use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::error::{LookupError, Result};
use crate::youtube::VideoId;

/// Where metadata comes from
#[derive(EnumIter, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// oEmbed title plus a synthesized catalog on the download service
    #[default]
    Live,
    /// Formats read from the watch page's player response
    Direct,
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMode::Live => f.write_str("live"),
            LookupMode::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LookupMode::iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown lookup mode: {s}"))
    }
}

// Container representation
#[derive(EnumIter, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Webm,
    M4a,
    Mp3,
}

impl Container {
    pub fn as_str(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
            Container::M4a => "m4a",
            Container::Mp3 => "mp3",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => ".mp4",
            Container::Webm => ".webm",
            Container::M4a => ".m4a",
            Container::Mp3 => ".mp3",
        }
    }

    /// Map an upstream MIME type such as `video/mp4; codecs="avc1"`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "video/mp4" => Some(Container::Mp4),
            "video/webm" | "audio/webm" => Some(Container::Webm),
            "audio/mp4" => Some(Container::M4a),
            "audio/mpeg" => Some(Container::Mp3),
            _ => None,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.');
        Container::iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unsupported container: {s}"))
    }
}

/// One downloadable variant of a video.
///
/// `url` always points at something that yields this variant's bytes when
/// fetched: the companion download service in live mode, the media host in
/// direct mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub quality: String,
    pub container: Container,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FormatDescriptor {
    pub fn new(quality: impl Into<String>, container: Container, url: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            container,
            url: url.into(),
            label: None,
        }
    }

    /// Set display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display label, derived as `720p (MP4)` when none was given
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!(
                "{} ({})",
                self.quality,
                self.container.as_str().to_ascii_uppercase()
            ),
        }
    }
}

/// Title and formats for one lookup.
///
/// Built only through [`VideoMetadata::new`], so each (container, quality)
/// pair appears at most once.
#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    id: VideoId,
    title: String,
    formats: Vec<FormatDescriptor>,
}

impl VideoMetadata {
    /// Keeps the first descriptor for each (container, quality) pair.
    pub fn new(id: VideoId, title: String, formats: Vec<FormatDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let formats = formats
            .into_iter()
            .filter(|f| seen.insert((f.container, f.quality.clone())))
            .collect();
        Self { id, title, formats }
    }

    pub fn id(&self) -> &VideoId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn formats(&self) -> &[FormatDescriptor] {
        &self.formats
    }

    /// Exact lookup of a (container, quality) pair.
    pub fn select(&self, container: Container, quality: &str) -> Result<&FormatDescriptor> {
        self.formats
            .iter()
            .find(|f| f.container == container && f.quality == quality)
            .ok_or_else(|| LookupError::SelectionUnavailable {
                container,
                quality: quality.to_string(),
            })
    }

    /// Quality labels offered for one container, in source order
    pub fn qualities(&self, container: Container) -> Vec<&str> {
        self.formats
            .iter()
            .filter(|f| f.container == container)
            .map(|f| f.quality.as_str())
            .collect()
    }
}

/// A source of video metadata keyed by identifier
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(&self, id: &VideoId) -> Result<VideoMetadata>;

    fn mode(&self) -> LookupMode;
}

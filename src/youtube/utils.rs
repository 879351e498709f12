use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

pub const VIDEO_ID_LEN: usize = 11;
pub const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Known URL shapes, as `(name, regex fragment)`.
///
/// When several shapes occur in one URL the right-most one wins; shapes
/// starting at the same offset are tried in table order.
pub const URL_SHAPES: &[(&str, &str)] = &[
    ("short", r"youtu\.be/"),
    ("v", r"v/"),
    ("user", r"/u/[A-Za-z0-9_]/"),
    ("embed", r"embed/"),
    ("watch", r"watch\?"),
];

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let shapes = URL_SHAPES
        .iter()
        .map(|(_, fragment)| format!("({fragment})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^.*(?:{shapes})\??v?=?([^#&?]*)")).expect("URL shape table is valid")
});

/// Canonical 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `https://www.youtube.com/watch?v=<id>`
    pub fn watch_url(&self) -> String {
        build_watch_url(WATCH_URL, self)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn captures(url: &str) -> Option<Captures<'_>> {
    URL_PATTERN.captures(url)
}

/// Extract the video identifier from a YouTube URL.
///
/// Returns `None` unless the captured token is exactly 11 characters.
pub fn extract_id(url: &str) -> Option<VideoId> {
    let caps = captures(url)?;
    let candidate = caps.get(URL_SHAPES.len() + 1)?.as_str();
    if candidate.chars().count() == VIDEO_ID_LEN {
        Some(VideoId(candidate.to_string()))
    } else {
        None
    }
}

/// Check if URL carries an extractable video identifier
pub fn is_valid(url: &str) -> bool {
    extract_id(url).is_some()
}

/// Name of the URL shape that produced the identifier
pub fn matched_shape(url: &str) -> Option<&'static str> {
    extract_id(url)?;
    let caps = captures(url)?;
    URL_SHAPES
        .iter()
        .enumerate()
        .find(|(i, _)| caps.get(i + 1).is_some())
        .map(|(_, (name, _))| *name)
}

/// Construct a watch-page URL from a base and video ID
pub fn build_watch_url(base: &str, id: &VideoId) -> String {
    format!("{}?v={}", base.trim_end_matches('/'), id)
}

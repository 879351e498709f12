use thiserror::Error;

use crate::core::Container;

/// Failure detail from talking to an upstream source.
///
/// Callers never branch on these; every variant surfaces as
/// [`LookupError::FetchFailed`].
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout for URL: {0}")]
    Timeout(String),

    #[error("HTTP error {status} for URL: {url}")]
    Http { status: u16, url: String },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No playable formats found")]
    NoPlayableFormats,

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch video info: {0}")]
    FetchFailed(#[from] SourceError),

    #[error("Format {container} {quality} is not available")]
    SelectionUnavailable { container: Container, quality: String },
}

/// The three outcomes a caller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupErrorKind {
    InvalidUrl,
    FetchFailed,
    SelectionUnavailable,
}

impl LookupError {
    pub fn kind(&self) -> LookupErrorKind {
        match self {
            LookupError::InvalidUrl(_) => LookupErrorKind::InvalidUrl,
            LookupError::FetchFailed(_) => LookupErrorKind::FetchFailed,
            LookupError::SelectionUnavailable { .. } => LookupErrorKind::SelectionUnavailable,
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let e = LookupError::InvalidUrl("x".to_string());
        assert_eq!(e.kind(), LookupErrorKind::InvalidUrl);

        let e: LookupError = SourceError::Parse("bad".to_string()).into();
        assert_eq!(e.kind(), LookupErrorKind::FetchFailed);

        let e = LookupError::SelectionUnavailable {
            container: Container::Mp4,
            quality: "144p".to_string(),
        };
        assert_eq!(e.kind(), LookupErrorKind::SelectionUnavailable);
        assert_eq!(e.to_string(), "Format mp4 144p is not available");
    }

    #[test]
    fn http_error_message_names_status() {
        let e = SourceError::Http {
            status: 404,
            url: "https://example.com".to_string(),
        };
        assert_eq!(e.to_string(), "HTTP error 404 for URL: https://example.com");
    }
}

//! Track resolution: turning a user query (link or free text) into a
//! playable track. The `MetadataFetcher` trait is the seam to the external
//! yt-dlp process; `resolver` layers the search-fallback retry policy on top.

pub(crate) mod resolver;
pub(crate) mod ytdl;

use serenity::async_trait;
use thiserror::Error;
use url::Url;

/// A resolved, playable track. Immutable once constructed; owned by exactly
/// one container (queue or history) at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Display title.
    pub title: String,
    /// Direct audio stream URL, sufficient to start playback.
    pub stream_url: String,
    /// The link or search text the user originally supplied.
    pub origin: String,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        stream_url: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            stream_url: stream_url.into(),
            origin: origin.into(),
        }
    }
}

/// Errors produced while resolving a query to a track.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The source demands sign-in / verification before serving the track.
    #[error("the source requires verification to access this track")]
    AccessDenied,

    /// Anything else: network failure, no results, malformed metadata.
    #[error("failed to resolve track: {0}")]
    Failed(String),
}

/// Interface to the external metadata/stream resolver.
///
/// `fetch` receives either a direct link or a free-text search phrase and
/// returns a playable track or an error; it performs no retries of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Track, ResolveError>;
}

/// Basic check whether the input is a link rather than a search phrase.
pub fn is_url(input: &str) -> bool {
    Url::parse(input)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_links_are_urls() {
        assert!(is_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_url("http://youtube.com/watch?v=abc"));
    }

    #[test]
    fn search_phrases_are_not_urls() {
        assert!(!is_url("never gonna give you up"));
        assert!(!is_url("file:otherscheme"));
        assert!(!is_url(""));
    }
}

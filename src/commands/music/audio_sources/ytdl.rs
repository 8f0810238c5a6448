//! `MetadataFetcher` implementation backed by the `yt-dlp` command-line tool.

use serenity::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{MetadataFetcher, ResolveError, Track, is_url};

/// Phrases yt-dlp emits when YouTube puts up a sign-in / verification wall.
const ACCESS_DENIED_MARKERS: [&str; 3] = [
    "Sign in to confirm",
    "confirm your age",
    "This video may be inappropriate",
];

/// Resolves queries by shelling out to `yt-dlp -j`.
#[derive(Default)]
pub struct YtDlp;

#[async_trait]
impl MetadataFetcher for YtDlp {
    async fn fetch(&self, query: &str) -> Result<Track, ResolveError> {
        let target = if is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch:{query}")
        };
        info!("Fetching track metadata for: {}", target);

        let output = Command::new("yt-dlp")
            .args([
                "-j",            // Output as JSON
                "--no-playlist", // Don't process playlists
                "-f",
                "bestaudio/best",
                target.as_str(),
            ])
            .output()
            .await
            .map_err(|e| ResolveError::Failed(format!("failed to run yt-dlp: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp failed for {}: {}", target, stderr);
            return Err(classify_failure(&stderr));
        }

        parse_metadata(&String::from_utf8_lossy(&output.stdout), query)
    }
}

/// Maps yt-dlp stderr to the resolver error taxonomy.
fn classify_failure(stderr: &str) -> ResolveError {
    if ACCESS_DENIED_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
    {
        ResolveError::AccessDenied
    } else {
        let reason = stderr
            .lines()
            .find(|line| line.starts_with("ERROR"))
            .unwrap_or("unknown yt-dlp error")
            .to_string();
        ResolveError::Failed(reason)
    }
}

/// Converts one `yt-dlp -j` JSON document into a [`Track`]. `origin` is the
/// user's original query, kept verbatim on the track.
fn parse_metadata(json: &str, origin: &str) -> Result<Track, ResolveError> {
    let mut value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ResolveError::Failed(format!("failed to parse yt-dlp metadata: {e}")))?;

    // Searches come back as a one-entry playlist envelope.
    if value.get("entries").is_some() {
        value = value["entries"]
            .get_mut(0)
            .map(serde_json::Value::take)
            .ok_or_else(|| ResolveError::Failed("no results for query".to_string()))?;
    }

    let stream_url = value["url"]
        .as_str()
        .ok_or_else(|| ResolveError::Failed("metadata is missing a stream URL".to_string()))?
        .to_string();

    let title = value["title"].as_str().unwrap_or("Unknown Title").to_string();

    Ok(Track {
        title,
        stream_url,
        origin: origin.to_string(),
    })
}

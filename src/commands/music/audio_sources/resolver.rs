//! Retry policy layered over a [`MetadataFetcher`].
//!
//! A free-text search that runs into the verification wall is retried with a
//! couple of alternate phrasings before giving up; a direct link never is.

use tracing::{info, warn};

use super::{MetadataFetcher, ResolveError, Track, is_url};

/// Suffixes appended to a search phrase when the plain search is blocked.
const SEARCH_FALLBACKS: [&str; 2] = ["lyrics", "audio"];

/// Resolves `query` to a playable track, applying the search-fallback policy.
///
/// The returned track always carries the caller's original `query` as its
/// `origin`, even when a fallback phrasing produced it.
pub async fn resolve(fetcher: &dyn MetadataFetcher, query: &str) -> Result<Track, ResolveError> {
    match fetcher.fetch(query).await {
        Err(ResolveError::AccessDenied) if !is_url(query) => {
            warn!("Search '{}' hit a verification wall, trying fallbacks", query);

            for suffix in SEARCH_FALLBACKS {
                let rephrased = format!("{query} {suffix}");
                info!("Retrying search as '{}'", rephrased);

                match fetcher.fetch(&rephrased).await {
                    Ok(mut track) => {
                        track.origin = query.to_string();
                        return Ok(track);
                    }
                    Err(e) => warn!("Fallback '{}' failed: {}", rephrased, e),
                }
            }

            Err(ResolveError::AccessDenied)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::audio_sources::MockMetadataFetcher;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn track(title: &str) -> Track {
        Track::new(title, "https://cdn.example/a.webm", "whatever")
    }

    #[tokio::test]
    async fn plain_success_needs_no_retry() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq("some song"))
            .times(1)
            .returning(|_| Ok(track("Some Song")));

        let resolved = resolve(&fetcher, "some song").await.unwrap();
        assert_eq!(resolved.title, "Some Song");
    }

    #[tokio::test]
    async fn blocked_search_retries_with_fallback_phrasings() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq("some song"))
            .times(1)
            .returning(|_| Err(ResolveError::AccessDenied));
        fetcher
            .expect_fetch()
            .with(eq("some song lyrics"))
            .times(1)
            .returning(|_| Err(ResolveError::AccessDenied));
        fetcher
            .expect_fetch()
            .with(eq("some song audio"))
            .times(1)
            .returning(|_| Ok(track("Some Song (Audio)")));

        let resolved = resolve(&fetcher, "some song").await.unwrap();
        assert_eq!(resolved.title, "Some Song (Audio)");
        // The fallback phrasing is an implementation detail; origin stays
        // what the user typed.
        assert_eq!(resolved.origin, "some song");
    }

    #[tokio::test]
    async fn blocked_search_gives_up_after_all_fallbacks() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .times(3)
            .returning(|_| Err(ResolveError::AccessDenied));

        let err = resolve(&fetcher, "some song").await.unwrap_err();
        assert_eq!(err, ResolveError::AccessDenied);
    }

    #[tokio::test]
    async fn blocked_link_is_never_retried() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .with(eq("https://youtu.be/blocked"))
            .times(1)
            .returning(|_| Err(ResolveError::AccessDenied));

        let err = resolve(&fetcher, "https://youtu.be/blocked").await.unwrap_err();
        assert_eq!(err, ResolveError::AccessDenied);
    }

    #[tokio::test]
    async fn generic_failure_is_not_retried() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Err(ResolveError::Failed("no results".into())));

        let err = resolve(&fetcher, "some song").await.unwrap_err();
        assert!(matches!(err, ResolveError::Failed(_)));
    }
}

//! The playback state machine: decides on every request or track-end event
//! whether to start streaming, enqueue, or advance, and recovers from tracks
//! that fail to start by skipping forward.

use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::input::{HttpRequest, Input};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, TrackEvent};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::HTTP_CLIENT;
use crate::commands::music::audio_sources::{MetadataFetcher, Track, resolver};
use crate::commands::music::utils::event_handlers::TrackEndNotifier;
use crate::commands::music::utils::music_manager::{MusicError, MusicManager, MusicResult};
use crate::commands::music::utils::player_state::{GuildPlayer, PlayerRegistry};
use crate::commands::music::utils::replies;

/// What `request_play` did with the resolved track.
pub enum PlayOutcome {
    /// Started streaming right away.
    Started(String),
    /// Appended to the queue at the given 1-based position.
    Queued { title: String, position: usize },
}

/// Resolve `query` and either start it immediately (first play of the
/// session) or append it to the queue. The active stream is never touched
/// when queueing.
pub async fn request_play(
    ctx: &Context,
    players: &Arc<PlayerRegistry>,
    fetcher: &dyn MetadataFetcher,
    guild_id: GuildId,
    channel_id: ChannelId,
    query: &str,
) -> MusicResult<PlayOutcome> {
    let call = MusicManager::get_call(ctx, guild_id).await?;
    let player_arc = players.get_or_create(guild_id);

    resolve_and_admit(fetcher, query, &player_arc, |track| async move {
        let handle = start_stream(ctx, players, &call, &track, guild_id, channel_id).await?;
        Ok((track, handle))
    })
    .await
}

/// The resolve-then-commit half of [`request_play`], factored out so the
/// state transitions are testable without a voice connection.
///
/// Resolution happens before the guild lock is taken, so a slow lookup does
/// not block other operations and a failed one leaves the player untouched.
/// Only once a track is in hand does the player decide between starting it
/// via `try_start` and appending it to the queue.
pub(crate) async fn resolve_and_admit<F, Fut>(
    fetcher: &dyn MetadataFetcher,
    query: &str,
    player_arc: &Arc<tokio::sync::Mutex<GuildPlayer>>,
    try_start: F,
) -> MusicResult<PlayOutcome>
where
    F: FnOnce(Track) -> Fut,
    Fut: Future<Output = Result<(Track, TrackHandle), MusicError>>,
{
    let track = resolver::resolve(fetcher, query).await?;

    let mut player = player_arc.lock().await;

    let stream_active = matches!(play_mode(player.current.as_ref()).await, Some(PlayMode::Play));
    if player.should_start_immediately(stream_active) {
        // A lingering paused stream would be replaced below; make sure its
        // end event does not advance on top of us.
        if player.current.is_some() {
            player.suppress_advance = true;
        }

        let (track, handle) = try_start(track).await?;
        let title = track.title.clone();
        player.current = Some(handle);
        player.mark_started(track);
        Ok(PlayOutcome::Started(title))
    } else {
        let title = track.title.clone();
        player.queue.push_back(track);
        Ok(PlayOutcome::Queued {
            title,
            position: player.queue.len(),
        })
    }
}

/// Move to the next queued track. Invoked from the track-end notifier (both
/// for natural ends and skips).
///
/// Tracks that fail to start are reported to the text channel and dropped,
/// and the loop keeps going until something plays or the queue drains. With
/// no voice connection the call is a silent no-op: the guild was left
/// mid-sequence.
pub async fn advance(
    ctx: &Context,
    players: &Arc<PlayerRegistry>,
    guild_id: GuildId,
    channel_id: ChannelId,
) {
    let call = match MusicManager::get_call(ctx, guild_id).await {
        Ok(call) => call,
        Err(_) => {
            debug!("Advance for guild {} without a voice connection, ignoring", guild_id);
            return;
        }
    };

    let player_arc = players.get_or_create(guild_id);
    let mut player = player_arc.lock().await;

    let (handle, failures) = drain_pending(&mut player, |track| {
        let ctx = ctx.clone();
        let players = Arc::clone(players);
        let call = Arc::clone(&call);
        async move {
            match start_stream(&ctx, &players, &call, &track, guild_id, channel_id).await {
                Ok(handle) => Ok((track, handle)),
                Err(e) => Err((track, e)),
            }
        }
    })
    .await;

    for (track, err) in &failures {
        warn!(
            "Failed to start '{}' for guild {}: {}",
            track.title, guild_id, err
        );
        if let Err(e) = channel_id
            .say(&ctx.http, replies::playback_failed(&track.title, err))
            .await
        {
            warn!("Failed to report playback error: {}", e);
        }
    }

    match handle {
        Some(handle) => {
            player.current = Some(handle);
            if let Some(track) = player.history.last() {
                if let Err(e) = channel_id
                    .say(&ctx.http, replies::now_playing(&track.title))
                    .await
                {
                    warn!("Failed to announce track: {}", e);
                }
            }
        }
        None => {
            debug!("Queue empty for guild {}, going idle", guild_id);
            player.current = None;
        }
    }
}

/// The advance loop over the pending queue, factored out of [`advance`] so
/// the fail-forward behavior is testable without a voice connection.
///
/// Pops tracks off the queue front, handing each to `try_start`, until one
/// starts or the queue empties. A started track moves into history; failed
/// ones end up in neither container and are returned with their errors.
pub(crate) async fn drain_pending<F, Fut, H>(
    player: &mut GuildPlayer,
    mut try_start: F,
) -> (Option<H>, Vec<(Track, MusicError)>)
where
    F: FnMut(Track) -> Fut,
    Fut: Future<Output = Result<(Track, H), (Track, MusicError)>>,
{
    let mut failures = Vec::new();

    loop {
        let Some(track) = player.next_pending() else {
            return (None, failures);
        };

        match try_start(track).await {
            Ok((track, handle)) => {
                player.mark_started(track);
                return (Some(handle), failures);
            }
            Err(failure) => failures.push(failure),
        }
    }
}

/// Stop the current stream so its end event advances to the next track.
pub async fn skip(players: &Arc<PlayerRegistry>, guild_id: GuildId) -> MusicResult<()> {
    let player_arc = players.get_or_create(guild_id);
    let player = player_arc.lock().await;

    let handle = player.current.as_ref().ok_or(MusicError::NothingPlaying)?;
    if !matches!(
        play_mode(Some(handle)).await,
        Some(PlayMode::Play | PlayMode::Pause)
    ) {
        return Err(MusicError::NothingPlaying);
    }

    if player.queue.is_empty() {
        return Err(MusicError::QueueEmpty);
    }

    info!("Skipping current track for guild {}", guild_id);
    handle
        .stop()
        .map_err(|e| MusicError::PlaybackStart(e.to_string()))?;

    Ok(())
}

/// Step one track back in history. The abandoned current track is parked at
/// the queue front so it plays again after the resumed one.
pub async fn go_back(
    ctx: &Context,
    players: &Arc<PlayerRegistry>,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> MusicResult<String> {
    let call = MusicManager::get_call(ctx, guild_id).await?;

    let player_arc = players.get_or_create(guild_id);
    let mut player = player_arc.lock().await;

    let previous = player.take_back().ok_or(MusicError::NoHistory)?;

    // Replacing the stream must not let the old track's end event advance
    // the queue into the track we just parked there.
    if let Some(handle) = player.current.take() {
        if matches!(
            play_mode(Some(&handle)).await,
            Some(PlayMode::Play | PlayMode::Pause)
        ) {
            player.suppress_advance = true;
            let _ = handle.stop();
        }
    }

    match start_stream(ctx, players, &call, &previous, guild_id, channel_id).await {
        Ok(handle) => {
            let title = previous.title.clone();
            player.current = Some(handle);
            player.mark_started(previous);
            info!("Went back to '{}' for guild {}", title, guild_id);
            Ok(title)
        }
        Err(e) => {
            // Put the previous track back on the history tail so the state
            // stays consistent and the command can be retried.
            player.history.push(previous);
            player.suppress_advance = false;
            Err(e)
        }
    }
}

/// Stop any active or paused stream and clear queue and history.
pub async fn stop(players: &Arc<PlayerRegistry>, guild_id: GuildId) {
    let player_arc = players.get_or_create(guild_id);
    let mut player = player_arc.lock().await;

    if let Some(handle) = player.current.take() {
        if matches!(
            play_mode(Some(&handle)).await,
            Some(PlayMode::Play | PlayMode::Pause)
        ) {
            player.suppress_advance = true;
            let _ = handle.stop();
        }
    }

    player.clear();
    info!("Stopped playback and cleared state for guild {}", guild_id);
}

/// Pause the active stream.
pub async fn pause(players: &Arc<PlayerRegistry>, guild_id: GuildId) -> MusicResult<()> {
    let player_arc = players.get_or_create(guild_id);
    let player = player_arc.lock().await;

    let handle = player.current.as_ref().ok_or(MusicError::NothingPlaying)?;
    match play_mode(Some(handle)).await {
        Some(PlayMode::Play) => handle
            .pause()
            .map_err(|e| MusicError::PlaybackStart(e.to_string())),
        _ => Err(MusicError::NothingPlaying),
    }
}

/// Resume a paused stream.
pub async fn resume(players: &Arc<PlayerRegistry>, guild_id: GuildId) -> MusicResult<()> {
    let player_arc = players.get_or_create(guild_id);
    let player = player_arc.lock().await;

    let handle = player.current.as_ref().ok_or(MusicError::NothingPaused)?;
    match play_mode(Some(handle)).await {
        Some(PlayMode::Pause) => handle
            .play()
            .map_err(|e| MusicError::PlaybackStart(e.to_string())),
        _ => Err(MusicError::NothingPaused),
    }
}

/// Current play mode of a track handle, if it can still be queried.
async fn play_mode(handle: Option<&TrackHandle>) -> Option<PlayMode> {
    let handle = handle?;
    handle.get_info().await.ok().map(|info| info.playing)
}

/// Start streaming `track` on this guild's call, registering the end
/// notifier that drives the automatic advance.
async fn start_stream(
    ctx: &Context,
    players: &Arc<PlayerRegistry>,
    call: &Arc<SerenityMutex<Call>>,
    track: &Track,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> MusicResult<TrackHandle> {
    let url = Url::parse(&track.stream_url).map_err(|e| {
        MusicError::PlaybackStart(format!("invalid stream URL for '{}': {e}", track.title))
    })?;

    let input: Input = HttpRequest::new(HTTP_CLIENT.clone(), url.to_string()).into();

    let mut handler = call.lock().await;
    let handle = handler.play_only_input(input);

    if let Err(e) = handle.add_event(
        Event::Track(TrackEvent::End),
        TrackEndNotifier {
            ctx: ctx.clone(),
            players: Arc::clone(players),
            guild_id,
            channel_id,
        },
    ) {
        // Without the notifier this track will not auto-advance when it ends.
        warn!(
            "Failed to register end notifier for '{}' in guild {}: {}",
            track.title, guild_id, e
        );
    }

    info!("Started streaming '{}' for guild {}", track.title, guild_id);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::audio_sources::{MockMetadataFetcher, ResolveError};
    use pretty_assertions::assert_eq;
    use tokio::sync::Mutex;

    fn track(title: &str) -> Track {
        Track::new(title, format!("https://cdn.example/{title}.webm"), title)
    }

    fn history_titles(player: &GuildPlayer) -> Vec<String> {
        player.history.iter().map(|t| t.title.clone()).collect()
    }

    /// try_start that fails for titles listed in `bad`, yielding unit
    /// handles otherwise.
    fn starter(
        bad: &'static [&'static str],
    ) -> impl FnMut(Track) -> std::future::Ready<Result<(Track, ()), (Track, MusicError)>> {
        move |track| {
            std::future::ready(if bad.contains(&track.title.as_str()) {
                let err = MusicError::PlaybackStart(format!("no stream for {}", track.title));
                Err((track, err))
            } else {
                Ok((track, ()))
            })
        }
    }

    #[tokio::test]
    async fn empty_queue_stays_idle_without_reports() {
        let mut player = GuildPlayer::default();
        let (handle, failures) = drain_pending(&mut player, starter(&[])).await;

        assert!(handle.is_none());
        assert!(failures.is_empty());
        assert!(player.history.is_empty());
    }

    #[tokio::test]
    async fn first_working_track_starts_and_enters_history() {
        let mut player = GuildPlayer::default();
        player.queue.extend([track("good"), track("later")]);

        let (handle, failures) = drain_pending(&mut player, starter(&[])).await;

        assert!(handle.is_some());
        assert!(failures.is_empty());
        assert_eq!(history_titles(&player), vec!["good"]);
        assert_eq!(player.pending_titles(), vec!["later"]);
    }

    #[tokio::test]
    async fn failing_tracks_are_skipped_until_one_works() {
        let mut player = GuildPlayer::default();
        player
            .queue
            .extend([track("bad1"), track("bad2"), track("good"), track("later")]);

        let (handle, failures) = drain_pending(&mut player, starter(&["bad1", "bad2"])).await;

        assert!(handle.is_some());
        assert_eq!(failures.len(), 2);
        // Failed tracks end up in neither queue nor history.
        assert_eq!(history_titles(&player), vec!["good"]);
        assert_eq!(player.pending_titles(), vec!["later"]);
    }

    #[tokio::test]
    async fn an_unbroken_run_of_failures_drains_the_queue() {
        let mut player = GuildPlayer::default();
        player.mark_started(track("already-played"));
        player
            .queue
            .extend([track("bad1"), track("bad2"), track("bad3")]);

        let (handle, failures) = drain_pending(&mut player, starter(&["bad1", "bad2", "bad3"])).await;

        assert!(handle.is_none());
        assert_eq!(failures.len(), 3);
        assert!(player.queue.is_empty());
        // History holds only tracks that actually started.
        assert_eq!(history_titles(&player), vec!["already-played"]);
    }

    #[tokio::test]
    async fn failed_resolution_leaves_player_untouched() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(ResolveError::Failed("no formats found".into())));

        let player_arc = Arc::new(Mutex::new(GuildPlayer::default()));
        {
            let mut player = player_arc.lock().await;
            player.mark_started(track("playing"));
            player.queue.push_back(track("pending"));
        }

        let result = resolve_and_admit(&fetcher, "bad query", &player_arc, |_track| async move {
            panic!("a failed resolution must never reach the start step")
        })
        .await;

        assert!(matches!(result, Err(MusicError::Resolve(_))));

        let player = player_arc.lock().await;
        assert_eq!(history_titles(&player), vec!["playing"]);
        assert_eq!(player.pending_titles(), vec!["pending"]);
        assert!(!player.suppress_advance);
    }

    #[tokio::test]
    async fn resolved_track_queues_mid_session_without_touching_the_stream() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher.expect_fetch().returning(|_| Ok(track("fresh")));

        let player_arc = Arc::new(Mutex::new(GuildPlayer::default()));
        player_arc.lock().await.mark_started(track("playing"));

        let outcome = resolve_and_admit(&fetcher, "fresh", &player_arc, |_track| async move {
            panic!("mid-session tracks queue up instead of starting")
        })
        .await;

        assert!(matches!(
            outcome,
            Ok(PlayOutcome::Queued { position: 1, .. })
        ));

        let player = player_arc.lock().await;
        assert_eq!(player.pending_titles(), vec!["fresh"]);
        assert_eq!(history_titles(&player), vec!["playing"]);
    }

    #[tokio::test]
    async fn failed_start_enters_neither_container() {
        let mut fetcher = MockMetadataFetcher::new();
        fetcher.expect_fetch().returning(|_| Ok(track("doomed")));

        let player_arc = Arc::new(Mutex::new(GuildPlayer::default()));

        let result = resolve_and_admit(&fetcher, "doomed", &player_arc, |_track| async move {
            Err(MusicError::PlaybackStart("stream refused".into()))
        })
        .await;

        assert!(matches!(result, Err(MusicError::PlaybackStart(_))));

        let player = player_arc.lock().await;
        assert!(player.queue.is_empty());
        assert!(player.history.is_empty());
        assert!(player.current.is_none());
    }
}

//! Per-guild playback state: the pending queue and the play history.
//!
//! Ownership rule: a [`Track`] lives in exactly one of the two containers at
//! any time and moves between them by value. All mutation happens behind the
//! per-guild mutex handed out by [`PlayerRegistry`], so a whole sequencing
//! operation (including its await points) is serialized against other
//! operations on the same guild.

use dashmap::DashMap;
use serenity::model::id::GuildId;
use songbird::tracks::TrackHandle;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::commands::music::audio_sources::Track;

/// Playback state for a single guild.
#[derive(Default)]
pub struct GuildPlayer {
    /// Pending tracks, front is next to play.
    pub queue: VecDeque<Track>,
    /// Played tracks in order; the tail is the one currently (or most
    /// recently) streaming.
    pub history: Vec<Track>,
    /// Handle of the active stream, if any.
    pub current: Option<TrackHandle>,
    /// Set when we kill a stream ourselves (stop/back/replace) so the
    /// track-end event does not advance the queue a second time.
    pub suppress_advance: bool,
}

impl GuildPlayer {
    /// Whether a freshly resolved track should start streaming immediately
    /// rather than queue up. Mirrors the session-start heuristic: nothing
    /// audible and nothing ever played since the last clear.
    ///
    /// Known edge case: "queue and history empty" is a proxy for "first play
    /// of the session", which can misfire right after a `stop` while a
    /// stream is still winding down. Kept as-is on purpose.
    pub fn should_start_immediately(&self, stream_active: bool) -> bool {
        !stream_active && self.queue.is_empty() && self.history.is_empty()
    }

    /// Pop the next pending track for the advance loop.
    pub fn next_pending(&mut self) -> Option<Track> {
        self.queue.pop_front()
    }

    /// Record a track whose stream has started.
    pub fn mark_started(&mut self, track: Track) {
        debug!("Now playing: {}", track.title);
        self.history.push(track);
    }

    /// The `back` state shuffle: park the current track (history tail) at
    /// the front of the queue and hand back the one before it. Returns
    /// `None` when there is no previous track, leaving state untouched.
    ///
    /// The caller streams the returned track and re-appends it to history
    /// via [`mark_started`](Self::mark_started) once that succeeds.
    pub fn take_back(&mut self) -> Option<Track> {
        if self.history.len() < 2 {
            return None;
        }

        let abandoned = self.history.pop()?;
        self.queue.push_front(abandoned);
        self.history.pop()
    }

    /// Empty both containers and drop the stream handle.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.history.clear();
        self.current = None;
    }

    /// Titles of the pending tracks, in play order.
    pub fn pending_titles(&self) -> Vec<String> {
        self.queue.iter().map(|t| t.title.clone()).collect()
    }
}

/// Owns every guild's player state for the lifetime of the process.
///
/// Entries are created on first use and never torn down; `clear` on the
/// contained player is what leave/stop use. Each entry carries its own async
/// mutex so sequencing operations on the same guild cannot interleave, while
/// different guilds never contend.
pub struct PlayerRegistry {
    players: DashMap<GuildId, Arc<Mutex<GuildPlayer>>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
        }
    }

    /// Returns the player for this guild, creating an empty one on first
    /// reference. Idempotent, never fails.
    pub fn get_or_create(&self, guild_id: GuildId) -> Arc<Mutex<GuildPlayer>> {
        self.players
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(GuildPlayer::default())))
            .clone()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

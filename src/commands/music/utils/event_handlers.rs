//! songbird event handlers bridging the audio delivery context back into the
//! guild player state.

use serenity::async_trait;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId};
use songbird::tracks::TrackHandle;
use std::sync::Arc;
use tracing::{debug, info};

use crate::commands::music::utils::player_state::PlayerRegistry;
use crate::commands::music::utils::sequencer;

/// Fires when a track ends (naturally or via an explicit stop) and advances
/// the queue. Runs on the shared runtime and takes the per-guild lock before
/// touching any state, so it is safe relative to in-flight commands.
pub struct TrackEndNotifier {
    pub ctx: Context,
    pub players: Arc<PlayerRegistry>,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(track_list) = ctx {
            info!("Track ended for guild {}", self.guild_id);

            let ended = track_list.first().map(|(_, handle)| handle.uuid());

            {
                let player_arc = self.players.get_or_create(self.guild_id);
                let mut player = player_arc.lock().await;

                // stop/back killed this stream deliberately and already
                // arranged the state; consume the suppression instead of
                // advancing.
                if player.suppress_advance {
                    debug!("Advance suppressed for guild {}", self.guild_id);
                    player.suppress_advance = false;
                    return None;
                }

                // An end event can also arrive after its stream has been
                // replaced without suppression, e.g. when the track ran out
                // naturally in the instant before `back` took the lock. Only
                // the current stream's end may advance.
                let current = player.current.as_ref().map(TrackHandle::uuid);
                if !is_current_stream(ended, current) {
                    debug!("Stale end event for guild {}, ignoring", self.guild_id);
                    return None;
                }
            }

            sequencer::advance(&self.ctx, &self.players, self.guild_id, self.channel_id).await;
        }
        None
    }
}

/// Whether an end event belongs to the stream the guild player currently
/// considers active.
fn is_current_stream<T: PartialEq>(ended: Option<T>, current: Option<T>) -> bool {
    match (ended, current) {
        (Some(ended), Some(current)) => ended == current,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some(1), Some(1) => true; "current stream end advances")]
    #[test_case(Some(1), Some(2) => false; "replaced stream end is ignored")]
    #[test_case(Some(1), None => false; "end after the player went idle")]
    #[test_case(None, Some(1) => false; "unidentifiable end")]
    fn stale_end_detection(ended: Option<u32>, current: Option<u32>) -> bool {
        is_current_stream(ended, current)
    }
}

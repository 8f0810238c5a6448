//! User-facing reply text. Every command answers with exactly one of these.

use serenity::model::id::ChannelId;

use crate::commands::music::audio_sources::ResolveError;
use crate::commands::music::utils::music_manager::MusicError;

pub fn joined(channel_id: ChannelId) -> String {
    format!("Joined <#{channel_id}>")
}

pub fn left() -> String {
    "Left the voice channel and cleared the queue 👋".to_string()
}

pub fn now_playing(title: &str) -> String {
    format!("▶️ Now playing: **{title}**")
}

pub fn queued(title: &str, position: usize) -> String {
    format!("➕ Added to queue (#{position}): **{title}**")
}

pub fn queue_list(titles: &[String]) -> String {
    if titles.is_empty() {
        return "📭 The queue is empty.".to_string();
    }

    let mut lines = vec!["🎶 **Queue:**".to_string()];
    for (i, title) in titles.iter().enumerate() {
        lines.push(format!("`{}.` {title}", i + 1));
    }
    lines.join("\n")
}

pub fn skipping() -> String {
    "⏭ Skipping to the next track...".to_string()
}

pub fn went_back(title: &str) -> String {
    format!("⏮ Went back to **{title}**")
}

pub fn stopped() -> String {
    "⏹ Stopped the music and cleared the queue.".to_string()
}

pub fn paused() -> String {
    "⏸ Paused.".to_string()
}

pub fn resumed() -> String {
    "▶️ Resumed.".to_string()
}

pub fn playback_failed(title: &str, err: &MusicError) -> String {
    format!("❌ Couldn't play **{title}**: {err}. Skipping ahead.")
}

/// One line of error text per failure mode; internal details stay in the log.
pub fn error_text(err: &MusicError) -> String {
    match err {
        MusicError::UserNotInVoiceChannel => {
            "You need to be in a voice channel first.".to_string()
        }
        MusicError::NotConnected => "I'm not in a voice channel.".to_string(),
        MusicError::NothingPlaying => "Nothing is playing right now.".to_string(),
        MusicError::NothingPaused => "Nothing is paused.".to_string(),
        MusicError::QueueEmpty => "No next track in the queue.".to_string(),
        MusicError::NoHistory => "No previous track in history.".to_string(),
        MusicError::Resolve(ResolveError::AccessDenied) => {
            "❌ This track requires sign-in verification. Try a different version or link."
                .to_string()
        }
        MusicError::Resolve(ResolveError::Failed(reason)) => {
            format!("❌ Couldn't fetch track info: {reason}")
        }
        MusicError::PlaybackStart(reason) => format!("❌ Couldn't start playback: {reason}"),
        MusicError::JoinError(reason) => format!("Failed to join the voice channel: {reason}"),
        MusicError::NotInGuild | MusicError::NoVoiceManager => {
            "Something went wrong on my end.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn queue_listing_is_one_indexed() {
        let listing = queue_list(&["First".to_string(), "Second".to_string()]);
        assert_eq!(listing, "🎶 **Queue:**\n`1.` First\n`2.` Second");
    }

    #[test]
    fn empty_queue_has_its_own_message() {
        assert_eq!(queue_list(&[]), "📭 The queue is empty.");
    }

    #[test]
    fn access_denied_names_the_remediation() {
        let text = error_text(&MusicError::Resolve(ResolveError::AccessDenied));
        assert!(text.contains("different version or link"));
    }
}

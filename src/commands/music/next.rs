use super::*;
use crate::commands::music::utils::{music_manager::MusicError, replies, sequencer};

/// Skip to the next track in the queue
#[poise::command(slash_command, prefix_command, aliases("skip"), category = "Music")]
pub async fn next(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    // Stopping the stream hands control to the end notifier, which starts
    // whatever is next.
    match sequencer::skip(&ctx.data().players, guild_id).await {
        Ok(()) => ctx.say(replies::skipping()).await?,
        Err(err) => ctx.say(replies::error_text(&err)).await?,
    };

    Ok(())
}

use super::*;
use crate::commands::music::utils::{music_manager::MusicError, replies, sequencer};

/// Pause the current track
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    match sequencer::pause(&ctx.data().players, guild_id).await {
        Ok(()) => ctx.say(replies::paused()).await?,
        Err(err) => ctx.say(replies::error_text(&err)).await?,
    };

    Ok(())
}

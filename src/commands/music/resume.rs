use super::*;
use crate::commands::music::utils::{music_manager::MusicError, replies, sequencer};

/// Resume a paused track
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    match sequencer::resume(&ctx.data().players, guild_id).await {
        Ok(()) => ctx.say(replies::resumed()).await?,
        Err(err) => ctx.say(replies::error_text(&err)).await?,
    };

    Ok(())
}

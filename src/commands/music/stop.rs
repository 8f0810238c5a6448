use super::*;
use crate::commands::music::utils::{music_manager::MusicError, replies, sequencer};

/// Stop playback and clear the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    sequencer::stop(&ctx.data().players, guild_id).await;
    ctx.say(replies::stopped()).await?;

    Ok(())
}

use super::*;
use crate::commands::music::utils::{music_manager::MusicError, replies, sequencer};

/// Go back to the previous track
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn back(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let result = sequencer::go_back(
        ctx.serenity_context(),
        &ctx.data().players,
        guild_id,
        ctx.channel_id(),
    )
    .await;

    match result {
        Ok(title) => ctx.say(replies::went_back(&title)).await?,
        Err(err) => ctx.say(replies::error_text(&err)).await?,
    };

    Ok(())
}

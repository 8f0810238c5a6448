use super::*;
use crate::commands::music::utils::{
    music_manager::{MusicError, MusicManager},
    replies,
};

/// Leave the voice channel and clear the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    match MusicManager::leave_channel(ctx.serenity_context(), guild_id).await {
        Ok(_) => {
            // Disconnecting tore down the stream; forget everything queued.
            let player_arc = ctx.data().players.get_or_create(guild_id);
            player_arc.lock().await.clear();

            ctx.say(replies::left()).await?;
        }
        Err(err) => {
            ctx.say(replies::error_text(&err)).await?;
        }
    }

    Ok(())
}

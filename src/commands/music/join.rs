use super::*;
use crate::commands::music::utils::{
    music_manager::{MusicError, MusicManager},
    replies,
};

/// Join your voice channel
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id)
        {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.say(replies::error_text(&err)).await?;
                return Ok(());
            }
        };

    // join_channel moves the bot if it is already connected elsewhere
    match MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await {
        Ok(_) => ctx.say(replies::joined(channel_id)).await?,
        Err(err) => ctx.say(replies::error_text(&err)).await?,
    };

    Ok(())
}

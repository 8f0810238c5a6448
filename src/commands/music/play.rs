use super::*;
use crate::commands::music::utils::{
    music_manager::{MusicError, MusicManager},
    replies,
    sequencer::{self, PlayOutcome},
};
use tracing::info;

/// Play a track from YouTube (link or search) or queue it up
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
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

    // Resolution can take a while; keep the interaction alive
    ctx.defer().await?;

    // Join the caller's channel if not already connected
    if MusicManager::get_call(ctx.serenity_context(), guild_id).await.is_err() {
        if let Err(err) =
            MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await
        {
            ctx.say(replies::error_text(&err)).await?;
            return Ok(());
        }
    }

    let data = ctx.data();
    let outcome = sequencer::request_play(
        ctx.serenity_context(),
        &data.players,
        data.resolver.as_ref(),
        guild_id,
        ctx.channel_id(),
        &query,
    )
    .await;

    match outcome {
        Ok(PlayOutcome::Started(title)) => ctx.say(replies::now_playing(&title)).await?,
        Ok(PlayOutcome::Queued { title, position }) => {
            ctx.say(replies::queued(&title, position)).await?
        }
        Err(err) => ctx.say(replies::error_text(&err)).await?,
    };

    Ok(())
}

use super::*;
use crate::commands::music::utils::{music_manager::MusicError, replies};

/// View the pending tracks in the queue
#[poise::command(slash_command, prefix_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(MusicError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let titles = {
        let player_arc = ctx.data().players.get_or_create(guild_id);
        let player = player_arc.lock().await;
        player.pending_titles()
    };

    ctx.say(replies::queue_list(&titles)).await?;

    Ok(())
}

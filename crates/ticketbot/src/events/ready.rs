use serenity::all::Ready;

use super::*;

pub async fn ready(
    ctx: &client::Context,
    data: &UserData,
    data_about_bot: &Ready,
) -> Result<(), Error> {
    let config = &data.config;
    let guild_name = config.guild.name(ctx).unwrap_or_else(|| config.guild.to_string());
    tracing::info!(
        bot.user = %data_about_bot.user.tag(),
        bot.guild_count = data_about_bot.guilds.len(),
        guild = %guild_name,
        started_at = %config.time_started,
        "Ticketbot is ready!"
    );
    Ok(())
}

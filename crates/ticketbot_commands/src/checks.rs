use poise::serenity_prelude::{RoleId, User};
use serenity::client;
use ticketbot_util::{
    extensions::PoiseContextExt,
    prelude::{Ctx, Res},
};

pub async fn check_is_staff(ctx: Ctx<'_>) -> Res<bool> {
    let config = ctx.get_config();
    check_role(ctx.serenity_context(), ctx.author(), config.guild, config.role_staff).await
}

#[tracing::instrument(skip_all, fields(user_id = %user.id, role_id = %role))]
async fn check_role(
    ctx: &client::Context,
    user: &User,
    guild: poise::serenity_prelude::GuildId,
    role: RoleId,
) -> Res<bool> {
    Ok(user.has_role(ctx, guild, role).await?)
}

/// Level of permission a given user has. Ordered such that Staff > User.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionLevel {
    User,
    Staff,
}

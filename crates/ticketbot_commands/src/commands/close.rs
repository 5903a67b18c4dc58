use anyhow::Context as _;
use poise::serenity_prelude::{PermissionOverwrite, PermissionOverwriteType, UserId};
use ticketbot_intake::{CLOSE_GRACE_DELAY, TICKET_CHANNEL_PREFIX};

use super::*;

/// Close this ticket. The channel gets deleted after a few seconds.
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn close(ctx: Ctx<'_>) -> Res<()> {
    let channel = ctx.guild_channel().await.context("Failed to load GuildChannel")?;
    if !is_ticket_channel(&channel.name) {
        abort_with!(UserErr::NotATicket);
    }

    let is_staff = crate::checks::check_is_staff(ctx).await?;
    if !is_staff && !is_ticket_owner(&channel.permission_overwrites, ctx.author().id) {
        abort_with!("Only staff or the owner of this ticket can close it");
    }

    if ctx.get_closing().schedule(ctx.channel_handle(), CLOSE_GRACE_DELAY).is_none() {
        abort_with!("This ticket is already being closed");
    }
    tracing::info!(
        channel.id = %channel.id,
        channel.name = %channel.name,
        closed_by = %ctx.author().tag(),
        "Closing ticket"
    );

    ctx.reply_embed_builder(|e| {
        e.description(format!(
            "🔒 Closing this ticket in {} seconds...",
            CLOSE_GRACE_DELAY.as_secs()
        ))
    })
    .await?;
    Ok(())
}

/// Keep a ticket open that is about to be closed.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    custom_data = "CmdMeta { perms: PermissionLevel::Staff }"
)]
pub async fn keepopen(ctx: Ctx<'_>) -> Res<()> {
    if ctx.get_closing().cancel(&ctx.channel_handle()) {
        ctx.say_success("Alright, this ticket stays open").await?;
    } else {
        ctx.say_error("This ticket isn't being closed").await?;
    }
    Ok(())
}

pub fn is_ticket_channel(name: &str) -> bool {
    name.strip_prefix(TICKET_CHANNEL_PREFIX).is_some_and(|rest| !rest.is_empty())
}

/// The owner of a ticket is the one member that got an explicit overwrite on its channel.
pub fn is_ticket_owner(overwrites: &[PermissionOverwrite], user: UserId) -> bool {
    overwrites.iter().any(|overwrite| {
        matches!(overwrite.kind, PermissionOverwriteType::Member(id) if id == user)
            && overwrite.allow.contains(Permissions::VIEW_CHANNEL)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use poise::serenity_prelude::{Permissions, RoleId};

    fn overwrite(kind: PermissionOverwriteType, allow: Permissions) -> PermissionOverwrite {
        PermissionOverwrite { allow, deny: Permissions::empty(), kind }
    }

    #[test]
    fn test_is_ticket_channel() {
        assert!(is_ticket_channel("ticket-zuk"));
        assert!(!is_ticket_channel("ticket-"));
        assert!(!is_ticket_channel("general"));
        assert!(!is_ticket_channel("my-ticket-zuk"));
    }

    #[test]
    fn test_is_ticket_owner() {
        let owner = UserId::new(42);
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(1)),
            },
            overwrite(
                PermissionOverwriteType::Member(owner),
                Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
            ),
            overwrite(PermissionOverwriteType::Role(RoleId::new(7)), Permissions::VIEW_CHANNEL),
        ];
        assert!(is_ticket_owner(&overwrites, owner));
        assert!(!is_ticket_owner(&overwrites, UserId::new(43)));
    }

    #[test]
    fn test_denied_member_is_not_owner() {
        let user = UserId::new(42);
        let overwrites = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Member(user),
        }];
        assert!(!is_ticket_owner(&overwrites, user));
    }
}

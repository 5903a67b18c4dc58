use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serenity::{
    all::{
        ChannelId, ChannelType, CreateChannel, GuildId, Http, HttpError, PermissionOverwrite,
        PermissionOverwriteType, Permissions, RoleId, StatusCode, UserId,
    },
    builder::GetMessages,
};
use ticketbot_intake::{
    AccessGrant, ChannelHandle, ChannelRequest, Directory, DirectoryError, Member, OrderSummary,
};
use ticketbot_util::{config::Config, embeds};

use crate::api::{
    feedbacks::{self, FeedbackEntry},
    Community,
};

/// [`Directory`] backed by the discord HTTP API.
#[derive(Clone)]
pub struct DiscordDirectory {
    http: Arc<Http>,
    config: Arc<Config>,
}

impl std::fmt::Debug for DiscordDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordDirectory").field("guild", &self.config.guild).finish_non_exhaustive()
    }
}

impl DiscordDirectory {
    pub fn new(http: Arc<Http>, config: Arc<Config>) -> Self {
        Self { http, config }
    }

    /// Fetch a member of the configured guild. `Ok(None)` if there is no such member.
    #[tracing::instrument(skip_all, fields(user.id = %user_id))]
    pub async fn fetch_member(
        &self,
        user_id: UserId,
    ) -> Result<Option<serenity::all::Member>, serenity::Error> {
        match self.config.guild.member(self.http.as_ref(), user_id).await {
            Ok(member) => Ok(Some(member)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl Community for DiscordDirectory {
    #[tracing::instrument(skip_all, fields(user.id = %user_id))]
    async fn assign_customer_role(&self, user_id: UserId) -> anyhow::Result<()> {
        let member = self
            .fetch_member(user_id)
            .await?
            .context("User is not a member of the server")?;
        member.add_role(&self.http, self.config.role_customer).await?;
        tracing::info!(role.id = %self.config.role_customer, "Assigned customer role");
        Ok(())
    }

    async fn is_member(&self, user_id: UserId) -> anyhow::Result<bool> {
        Ok(self.fetch_member(user_id).await?.is_some())
    }

    async fn recent_feedbacks(&self, limit: u8) -> anyhow::Result<Vec<FeedbackEntry>> {
        let messages = self
            .config
            .channel_feedback
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await
            .context("Failed to fetch feedback messages")?;
        Ok(feedbacks::collect_feedbacks(&messages))
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(res))
            if res.status_code == StatusCode::NOT_FOUND
    )
}

fn parse_id(operation: &'static str, id: &str) -> Result<u64, DirectoryError> {
    id.parse::<u64>()
        .ok()
        .filter(|&x| x != 0)
        .ok_or_else(|| DirectoryError::failed(operation, format!("'{id}' is not a valid id")))
}

/// Turn access grants into discord permission overwrites for the given guild.
pub fn to_overwrites(
    guild: GuildId,
    grants: &[AccessGrant],
) -> Result<Vec<PermissionOverwrite>, DirectoryError> {
    let participant = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
    grants
        .iter()
        .map(|grant| {
            Ok(match grant {
                AccessGrant::DenyEveryone => PermissionOverwrite {
                    allow: Permissions::empty(),
                    deny: Permissions::VIEW_CHANNEL,
                    // the @everyone role shares its id with the guild
                    kind: PermissionOverwriteType::Role(RoleId::new(guild.get())),
                },
                AccessGrant::AllowMember(id) => PermissionOverwrite {
                    allow: participant,
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Member(UserId::new(parse_id(
                        "create_private_channel",
                        id,
                    )?)),
                },
                AccessGrant::AllowRole(id) => PermissionOverwrite {
                    allow: participant,
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Role(RoleId::new(parse_id(
                        "create_private_channel",
                        id,
                    )?)),
                },
            })
        })
        .collect()
}

#[async_trait]
impl Directory for DiscordDirectory {
    async fn resolve_member(&self, identity: &str) -> Result<Option<Member>, DirectoryError> {
        // something that isn't even a snowflake can't be a member
        let Ok(user_id) = parse_id("resolve_member", identity) else {
            return Ok(None);
        };
        let member = self
            .fetch_member(UserId::new(user_id))
            .await
            .map_err(|e| DirectoryError::failed("resolve_member", e))?;
        Ok(member.map(|member| Member {
            id: member.user.id.to_string(),
            display_name: member.user.name.clone(),
            avatar_url: Some(member.face()),
        }))
    }

    #[tracing::instrument(skip_all, fields(channel.name = %request.name))]
    async fn create_private_channel(
        &self,
        request: &ChannelRequest,
    ) -> Result<ChannelHandle, DirectoryError> {
        let overwrites = to_overwrites(self.config.guild, &request.grants)?;
        let channel = self
            .config
            .guild
            .create_channel(
                self.http.as_ref(),
                CreateChannel::new(&request.name)
                    .kind(ChannelType::Text)
                    .category(self.config.category_tickets)
                    .permissions(overwrites),
            )
            .await
            .map_err(|e| DirectoryError::failed("create_private_channel", e))?;
        Ok(ChannelHandle(channel.id.to_string()))
    }

    async fn send_message(
        &self,
        destination: &ChannelHandle,
        summary: &OrderSummary,
    ) -> Result<(), DirectoryError> {
        let channel_id = ChannelId::new(parse_id("send_message", &destination.0)?);
        channel_id
            .send_message(self.http.as_ref(), embeds::make_summary_message(summary))
            .await
            .map_err(|e| DirectoryError::failed("send_message", e))?;
        Ok(())
    }

    async fn delete_channel(&self, channel: &ChannelHandle) -> Result<(), DirectoryError> {
        let channel_id = ChannelId::new(parse_id("delete_channel", &channel.0)?);
        channel_id
            .delete(self.http.as_ref())
            .await
            .map_err(|e| DirectoryError::failed("delete_channel", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ticket_overwrites() {
        let guild = GuildId::new(100);
        let grants = vec![
            AccessGrant::DenyEveryone,
            AccessGrant::AllowMember("42".into()),
            AccessGrant::AllowRole("7".into()),
        ];
        let overwrites = to_overwrites(guild, &grants).unwrap();
        assert_eq!(overwrites.len(), 3);
        assert!(matches!(overwrites[0].kind, PermissionOverwriteType::Role(id) if id.get() == 100));
        assert!(overwrites[0].deny.contains(Permissions::VIEW_CHANNEL));
        assert!(matches!(overwrites[1].kind, PermissionOverwriteType::Member(id) if id.get() == 42));
        assert!(overwrites[1].allow.contains(Permissions::SEND_MESSAGES));
        assert!(matches!(overwrites[2].kind, PermissionOverwriteType::Role(id) if id.get() == 7));
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        let grants = vec![AccessGrant::AllowMember("not-a-snowflake".into())];
        assert!(to_overwrites(GuildId::new(1), &grants).is_err());
        assert!(parse_id("test", "0").is_err());
    }
}

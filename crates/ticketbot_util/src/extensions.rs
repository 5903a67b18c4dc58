use crate::{config::Config, embeds, prelude::Ctx};

use anyhow::{Context, Result};
use poise::{CreateReply, ReplyHandle};
use serenity::{
    async_trait,
    builder::{CreateEmbed, CreateEmbedAuthor, CreateMessage},
    http::Http,
    model::{
        channel::Message,
        id::{ChannelId, GuildId},
        prelude::User,
    },
};
use std::{fmt::Display, sync::Arc};
use ticketbot_intake::{ChannelHandle, ClosingQueue};

type StdResult<T, E> = std::result::Result<T, E>;

#[extend::ext(name = PoiseContextExt)]
#[async_trait]
pub impl<'a> Ctx<'a> {
    fn get_config(&self) -> Arc<Config> {
        self.data().config.clone()
    }

    fn get_closing(&self) -> Arc<ClosingQueue> {
        self.data().closing.clone()
    }

    /// The channel this command was invoked in, as the intake sees it.
    fn channel_handle(&self) -> ChannelHandle {
        ChannelHandle(self.channel_id().to_string())
    }

    /// Send an embed. Convenient simpler form of [`Self::reply_embed_full`].
    async fn reply_embed_builder(
        &self,
        build: impl FnOnce(CreateEmbed) -> CreateEmbed + Send + Sync,
    ) -> StdResult<ReplyHandle<'_>, serenity::Error> {
        self.reply_embed_full(false, build(embeds::base_embed())).await
    }

    /// Send an embed, making it ephemeral optionally.
    /// Will make message a reply unconditionally.
    async fn reply_embed_full(
        &self,
        ephemeral: bool,
        embed: CreateEmbed,
    ) -> StdResult<ReplyHandle<'_>, serenity::Error> {
        let reply = CreateReply::default().ephemeral(ephemeral).embed(embed).reply(true);
        self.send(reply).await
    }

    async fn say_success(
        &self,
        text: impl Display + Send + Sync + 'static,
    ) -> StdResult<ReplyHandle<'_>, serenity::Error> {
        tracing::info!(
            msg.ephemeral = true,
            msg.content = %text,
            msg.responding_to_user = %self.author().tag(),
            "Sending success message to user"
        );
        self.reply_embed_full(true, embeds::make_success_embed(&text.to_string())).await
    }

    async fn say_error(
        &self,
        text: impl Display + Send + Sync + 'static,
    ) -> StdResult<ReplyHandle<'_>, serenity::Error> {
        tracing::info!(
            msg.ephemeral = true,
            msg.content = %text,
            msg.responding_to_user = %self.author().tag(),
            "Sending error message to user"
        );
        self.reply_embed_full(true, embeds::make_error_embed(&text.to_string())).await
    }
}

#[extend::ext]
#[async_trait]
pub impl GuildId {
    async fn send_embed(
        &self,
        http: &Http,
        channel_id: ChannelId,
        build: impl FnOnce(CreateEmbed) -> CreateEmbed + Send + Sync,
    ) -> Result<Message> {
        let embed = build(embeds::base_embed());
        Ok(channel_id
            .send_message(http, CreateMessage::default().embed(embed))
            .await
            .context("Failed to send embed message")?)
    }
}

#[extend::ext]
pub impl CreateEmbed {
    fn field_opt(
        self,
        name: impl Into<String>,
        value: Option<impl Into<String>>,
        inline: bool,
    ) -> Self {
        match value {
            Some(value) => self.field(name, value, inline),
            None => self,
        }
    }

    fn author_user(self, u: &User) -> Self {
        self.author(
            CreateEmbedAuthor::new(u.tag())
                .icon_url(u.face())
                .url(format!("https://discord.com/users/{}", u.id)),
        )
    }
}

use ticketbot_intake::ChannelHandle;
use ticketbot_util::{prelude::Error, UserData};

use serenity::all::FullEvent;
use serenity::client;

mod channel_delete;
pub mod ready;

pub async fn handle_event(
    ctx: &client::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, UserData, Error>,
    data: &UserData,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => ready::ready(ctx, data, data_about_bot).await,
        FullEvent::ChannelDelete { channel, .. } => {
            channel_delete::channel_delete(data, ChannelHandle(channel.id.to_string()))
        }
        _ => Ok(()),
    }
}

use serenity::{
    builder::{CreateEmbed, CreateMessage},
    model::{id::UserId, Timestamp},
    prelude::Mentionable,
};
use ticketbot_intake::OrderSummary;

pub fn base_embed() -> CreateEmbed {
    CreateEmbed::default().timestamp(Timestamp::now())
}

pub fn make_success_embed(text: &str) -> CreateEmbed {
    CreateEmbed::default().description(text).color(0xb8bb26u32)
}

pub fn make_error_embed(text: &str) -> CreateEmbed {
    CreateEmbed::default().description(text).color(0xfb4934u32)
}

pub fn make_summary_embed(summary: &OrderSummary) -> CreateEmbed {
    let mut e = base_embed()
        .title(&summary.title)
        .description(&summary.description)
        .color(summary.color)
        .fields(summary.fields.iter().map(|f| (f.name.clone(), f.value.clone(), f.inline)));
    if let Some(thumbnail) = &summary.thumbnail {
        e = e.thumbnail(thumbnail);
    }
    e
}

/// The summary as a message, pinging the mentioned user if there is one and it's a valid id.
pub fn make_summary_message(summary: &OrderSummary) -> CreateMessage {
    let mut msg = CreateMessage::default().embed(make_summary_embed(summary));
    let user_id = summary.mention.as_deref().and_then(|x| x.parse::<u64>().ok());
    if let Some(user_id) = user_id.filter(|&x| x != 0) {
        msg = msg.content(format!("Hey {}!", UserId::new(user_id).mention()));
    }
    msg
}

use serde::Serialize;
use serenity::model::{
    channel::{Embed, Message},
    Timestamp,
};
use ticketbot_commands::commands::feedback::{FEEDBACK_COMMENT_FIELD, FEEDBACK_RATING_FIELD};

/// Number of recent messages in the feedback channel that are considered.
pub const FEEDBACK_LIMIT: u8 = 20;

const ANONYMOUS_NAME: &str = "Anonymous";
const DEFAULT_AVATAR: &str = "https://i.imgur.com/9UQhVJ0.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackEntry {
    pub username: String,
    pub avatar: String,
    pub rating: String,
    pub comment: String,
    pub date: Timestamp,
}

impl FeedbackEntry {
    /// Read a feedback back out of an embed posted by the `feedback` command.
    pub fn from_embed(embed: &Embed, posted_at: Timestamp) -> Self {
        let field = |name: &str| {
            embed
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.value.clone())
                .unwrap_or_default()
        };
        let author = embed.author.as_ref();
        FeedbackEntry {
            username: author
                .map(|a| a.name.clone())
                .filter(|x| !x.is_empty())
                .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            avatar: author
                .and_then(|a| a.icon_url.clone())
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            rating: field(FEEDBACK_RATING_FIELD),
            comment: field(FEEDBACK_COMMENT_FIELD),
            date: embed.timestamp.unwrap_or(posted_at),
        }
    }
}

/// Every message that carries an embed becomes one entry, the rest is skipped.
pub fn collect_feedbacks(messages: &[Message]) -> Vec<FeedbackEntry> {
    messages
        .iter()
        .filter_map(|msg| {
            let embed = msg.embeds.first()?;
            Some(FeedbackEntry::from_embed(embed, msg.timestamp))
        })
        .collect()
}

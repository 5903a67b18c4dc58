use super::*;

pub const FEEDBACK_RATING_FIELD: &str = "Rating";
pub const FEEDBACK_COMMENT_FIELD: &str = "Comment";

/// Tell us how your order went!
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn feedback(
    ctx: Ctx<'_>,
    #[description = "How happy were you with the service, from 1 to 5"]
    #[min = 1]
    #[max = 5]
    rating: u8,
    #[description = "What went well, what didn't?"]
    #[rest]
    comment: String,
) -> Res<()> {
    if !(1..=5).contains(&rating) {
        abort_with!("The rating must be between 1 and 5");
    }
    if comment.trim().is_empty() {
        abort_with!("Please leave a comment as well");
    }

    let config = ctx.get_config();
    let author = ctx.author();
    config
        .post_feedback(&ctx.serenity_context().http, |e| {
            e.author_user(author)
                .title("New feedback")
                .field(FEEDBACK_RATING_FIELD, util::format_rating(rating), true)
                .field(FEEDBACK_COMMENT_FIELD, util::ellipsis_text(comment.trim(), 1024), false)
        })
        .await?;
    tracing::info!(feedback.rating = rating, feedback.author = %author.tag(), "Received feedback");

    ctx.say_success("Thanks for your feedback!").await?;
    Ok(())
}

use poise::{serenity_prelude::HttpError, CreateReply, TooFewArguments, TooManyArguments};
use ticketbot_commands::commands;

use ticketbot_util::{
    extensions::PoiseContextExt,
    log_error,
    prelude::{self, Ctx},
    UserData,
};

/// Handler passed to poise
pub async fn on_error(error: poise::FrameworkError<'_, UserData, prelude::Error>) {
    use poise::FrameworkError::*;
    if let Some(ctx) = error.ctx() {
        tracing::error!(
            error.message = %error,
            command_name = %ctx.command().qualified_name,
            invocation = %ctx.invocation_string(),
            author.tag = %ctx.author().tag(),
            "Error occured in context, more details will follow"
        );
    }
    match error {
        Command { error, ctx, .. } => {
            handle_command_error(ctx, error).await;
        }
        CommandPanic { payload, ctx, .. } => {
            log_error!(ctx.say_error("Something went wrong").await);
            tracing::error!(
                error.message = %payload.unwrap_or_default(),
                command_name = ctx.command().qualified_name,
                invocation = %ctx.invocation_string(),
                "Command panicked"
            );
        }
        Setup { error, .. } => {
            tracing::error!(error.message = %error, "Error during setup: {}", error)
        }
        EventHandler { error, event, .. } => {
            tracing::error!(
                event = %event.snake_case_name(),
                error.message = %error,
                "Error in event listener: {}",
                error
            );
        }
        ArgumentParse { input, ctx, error, .. } => {
            log_error!(handle_argument_parse_error(ctx, error, input).await);
        }
        MissingBotPermissions { missing_permissions, ctx, .. } => {
            log_error!(
                ctx.say_error(format!(
                    "It seems like I am lacking the {missing_permissions} permission",
                ))
                .await
            );
            tracing::error!(
                error.missing_permissions = %missing_permissions,
                command_name = ctx.command().qualified_name,
                "Bot missing permissions: {missing_permissions}",
            )
        }
        MissingUserPermissions { ctx, .. } => {
            log_error!(ctx.say_error("Missing permissions").await);
        }
        GuildOnly { ctx, .. } => {
            log_error!(ctx.say_error("This can only be used in the server").await);
        }
        CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                log_error!(
                    ctx.say_error("Something went wrong while checking your permissions").await
                );
                tracing::error!(
                    error.message = %error,
                    command_name = %ctx.command().qualified_name.as_str(),
                    "Error while running command check: {error}"
                );
            } else {
                log_error!(
                    ctx.send(
                        CreateReply::default()
                            .ephemeral(true)
                            .content("Only staff members can do this")
                    )
                    .await
                );
            }
        }
        UnknownCommand { msg, msg_content, prefix, .. } => {
            tracing::debug!(
                msg.id = %msg.id,
                msg.content = %msg_content,
                "Message starts with command prefix `{prefix}`, but wasn't a command",
            );
        }
        other => {
            tracing::error!(error.message = %other, "unhandled error received from poise");
        }
    }
}

async fn handle_argument_parse_error(
    ctx: Ctx<'_>,
    error: Box<dyn std::error::Error + Send + Sync>,
    input: Option<String>,
) -> anyhow::Result<()> {
    let msg = argument_error_message(error.as_ref(), input);
    ctx.say_error(msg).await?;
    Ok(())
}

fn argument_error_message(
    error: &(dyn std::error::Error + Send + Sync + 'static),
    input: Option<String>,
) -> String {
    if error.downcast_ref::<TooManyArguments>().is_some() {
        "Too many arguments".to_string()
    } else if error.downcast_ref::<TooFewArguments>().is_some() {
        "Too few arguments".to_string()
    } else if let Some(input) = input {
        format!("Malformed argument '{}'", input)
    } else {
        tracing::warn!(error.message = %error, "Unclear argument parse error: {error}");
        "Command used incorrectly".to_string()
    }
}

async fn handle_command_error(ctx: Ctx<'_>, err: prelude::Error) {
    if let Some(inner_err) = err.downcast_ref::<commands::UserErr>() {
        let issue = inner_err.to_string();
        log_error!(ctx.say_error(format!("Error: {issue}")).await);
        tracing::info!(
            user_error.message = %issue,
            command_name = %ctx.command().qualified_name.as_str(),
            invocation = %ctx.invocation_string(),
            "User error"
        );
    } else if let Some(inner_err) = err.downcast_ref::<serenity::Error>() {
        tracing::warn!(
            command_name = %ctx.command().qualified_name.as_str(),
            error.message = %err,
            error.root_cause = %err.root_cause(),
            "Serenity error [handling {}]: {err}",
            ctx.command().qualified_name,
        );
        let reply = match inner_err {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(res))
                if res.status_code == serenity::http::StatusCode::FORBIDDEN =>
            {
                "I'm not allowed to do that".to_string()
            }
            serenity::Error::Model(err) => err.to_string(),
            _ => "Something went wrong".to_string(),
        };
        log_error!(ctx.say_error(reply).await);
    } else {
        log_error!(ctx.say_error("Something went wrong").await);
        tracing::warn!(
            command_name = %ctx.command().qualified_name.as_str(),
            invocation = %ctx.invocation_string(),
            error.message = %err,
            error.root_cause = %err.root_cause(),
            "Internal error [handling {}]: {err:?}",
            ctx.command().qualified_name,
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_malformed_argument_names_input() {
        // what `!pay lots` or `!feedback great` run into
        let error = "lots".parse::<f64>().unwrap_err();
        assert_eq!(
            argument_error_message(&error, Some("lots".to_string())),
            "Malformed argument 'lots'"
        );
        let error = "great".parse::<u8>().unwrap_err();
        assert_eq!(
            argument_error_message(&error, Some("great".to_string())),
            "Malformed argument 'great'"
        );
    }

    #[test]
    fn test_argument_error_without_input() {
        let error = "".parse::<u8>().unwrap_err();
        assert_eq!(argument_error_message(&error, None), "Command used incorrectly");
    }
}

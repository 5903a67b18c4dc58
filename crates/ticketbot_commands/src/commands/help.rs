use itertools::Itertools;

use super::*;

/// Show this list
#[poise::command(slash_command, guild_only, track_edits, prefix_command)]
pub async fn help(
    ctx: Ctx<'_>,
    #[description = "The command to get help for."]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Res<()> {
    let commands = ctx
        .framework()
        .options()
        .commands
        .iter()
        .filter(|x| !x.hide_in_help && (x.slash_action.is_some() || x.prefix_action.is_some()))
        .collect_vec();

    if let Some(desired_command) = command {
        let command = commands
            .iter()
            .find(|c| c.name == desired_command || c.aliases.contains(&desired_command))
            .user_error(&format!("Unknown command `{}`", desired_command))?;
        reply_help_single(ctx, command).await?;
    } else {
        // find commands that the user has access to
        let available_commands = commands.into_iter().map(|cmd| async move {
            for check in cmd.checks.iter() {
                match check(ctx).await {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => {
                        tracing::error!(error.message = %e, "Error while running check");
                    }
                }
            }
            Some(cmd)
        });
        let available_commands =
            futures::future::join_all(available_commands).await.into_iter().flatten().collect_vec();

        reply_help_full(ctx, &available_commands).await?;
    }
    Ok(())
}

async fn reply_help_single(ctx: Ctx<'_>, command: &Command<UserData, Error>) -> Res<()> {
    ctx.reply_embed_builder(|e| {
        e.title(format!("Help for {}", command.name))
            .description(
                command
                    .help_text
                    .clone()
                    .or_else(|| command.description.clone())
                    .unwrap_or_else(|| "No description".to_string()),
            )
    })
    .await?;
    Ok(())
}

async fn reply_help_full(ctx: Ctx<'_>, commands: &[&Command<UserData, Error>]) -> Res<()> {
    let fields = commands
        .iter()
        .map(|command| {
            let name = format!("**/{}**", command.name);
            let description = command.description.clone().unwrap_or_else(|| "No description".to_string());
            (name, description, false)
        })
        .collect_vec();

    ctx.reply_embed_builder(|e| e.title("Help").fields(fields)).await?;
    Ok(())
}

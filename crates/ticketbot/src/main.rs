use poise::serenity_prelude::GatewayIntents;
use serenity::all::{ActivityData, OnlineStatus};
use std::sync::Arc;
use ticketbot_commands::commands;
use ticketbot_intake::{ClosingQueue, OrderIntakeService};
use ticketbot_util::{config::Config, log_error, prelude::Ctx, UserData};

mod api;
mod directory;
mod error_handling;
mod events;
mod logging;

use crate::{directory::DiscordDirectory, logging::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(Config::from_environment()?);
    tracing::info!(
        guild = %config.guild,
        cooldown_secs = config.cooldown.as_secs(),
        api.port = config.api_port,
        "Loaded configuration"
    );

    let framework_options = poise::FrameworkOptions {
        commands: commands::all_commands(),
        on_error: |err| Box::pin(error_handling::on_error(err)),
        pre_command: |ctx| Box::pin(pre_command(ctx)),
        owners: config.owners.clone(),
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::handle_event(ctx, event, framework, data))
        },
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some("!".into()),
            edit_tracker: Some(Arc::new(poise::EditTracker::for_timespan(
                std::time::Duration::from_secs(10),
            ))),
            execute_self_messages: false,
            case_insensitive_commands: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let setup_config = config.clone();
    let framework = poise::Framework::builder()
        .options(framework_options)
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                let config = setup_config;
                poise::builtins::register_in_guild(ctx, &framework.options().commands, config.guild)
                    .await?;

                let directory = Arc::new(DiscordDirectory::new(ctx.http.clone(), config.clone()));
                let intake =
                    Arc::new(OrderIntakeService::new(config.intake_config(), directory.clone()));
                let closing = Arc::new(ClosingQueue::new(directory.clone()));

                let api_state = api::ApiState { intake: intake.clone(), community: directory };
                let api_port = config.api_port;
                tokio::spawn(async move {
                    log_error!("HTTP api stopped", api::serve(api_state, api_port).await);
                });

                Ok(UserData { config, intake, closing })
            })
        })
        .build();

    let gateway_intents = GatewayIntents::non_privileged()
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::Client::builder(&config.discord_token, gateway_intents)
        .activity(ActivityData::watching("for new orders"))
        .status(OnlineStatus::Online)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}

async fn pre_command(ctx: Ctx<'_>) {
    let content = match ctx {
        poise::Context::Application(_) => ctx.invocation_string(),
        poise::Context::Prefix(prefix) => prefix.msg.content.to_string(),
    };

    tracing::info!(
        command_name = ctx.command().qualified_name.as_str(),
        msg.content = %content,
        msg.author = %ctx.author().tag(),
        msg.author_id = %ctx.author().id,
        msg.id = %ctx.id(),
        msg.channel_id = %ctx.channel_id(),
        "{} invoked by {}",
        ctx.command().name,
        ctx.author().tag()
    );
}

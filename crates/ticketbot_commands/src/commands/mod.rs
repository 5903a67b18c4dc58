use poise::serenity_prelude::Permissions;
use poise::Command;
use ticketbot_util::abort_with;
use ticketbot_util::extensions::*;
use ticketbot_util::prelude::*;
use ticketbot_util::util;

pub mod errors;
pub use errors::*;

use crate::checks::PermissionLevel;

pub mod close;
pub mod feedback;
pub mod help;
pub mod pay;

pub fn all_commands() -> Vec<poise::Command<UserData, Error>> {
    let mut all_commands = vec![
        // General
        help::help(),
        close::close(),
        feedback::feedback(),
        // Staff-only
        close::keepopen(),
        pay::pay(),
    ];
    for command in all_commands.iter_mut() {
        preprocess_command(command);
    }
    all_commands
}

pub fn preprocess_command(command: &mut Command<UserData, anyhow::Error>) {
    if let Some(meta) = command.custom_data.downcast_ref::<CmdMeta>() {
        if meta.perms == PermissionLevel::Staff {
            command.checks.push(|ctx| Box::pin(crate::checks::check_is_staff(ctx)));
        }
        command.default_member_permissions = match meta.perms {
            PermissionLevel::Staff => Permissions::MANAGE_CHANNELS,
            PermissionLevel::User => Permissions::empty(),
        };
        command.category = Some(command.category.clone().unwrap_or_else(|| {
            match meta.perms {
                PermissionLevel::Staff => "Staff",
                PermissionLevel::User => "Member",
            }
            .to_string()
        }));
    }

    for subcommand in command.subcommands.iter_mut() {
        preprocess_command(subcommand);
    }
}

pub struct CmdMeta {
    perms: PermissionLevel,
}

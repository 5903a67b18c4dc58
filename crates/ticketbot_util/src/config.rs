use std::{collections::HashSet, num::NonZeroU64, time::Duration};

use poise::serenity_prelude::{ChannelId, CreateEmbed, GuildId, RoleId};
use serenity::{
    http::Http,
    model::{channel::Message, id::UserId},
};
use ticketbot_intake::{ChannelHandle, IntakeConfig};

use crate::{
    extensions::GuildIdExt,
    util::{
        parse_env_var_or, parse_optional_env_var, parse_required_env_var, required_env_var,
    },
};

#[derive(Debug)]
pub struct Config {
    pub discord_token: String,

    pub owners: HashSet<UserId>,

    pub guild: GuildId,
    pub role_staff: RoleId,
    pub role_customer: RoleId,

    pub category_tickets: ChannelId,
    pub channel_orders: Option<ChannelId>,
    pub channel_feedback: ChannelId,

    pub payment_address: String,

    pub cooldown: Duration,
    pub directory_timeout: Duration,
    pub api_port: u16,

    pub time_started: chrono::DateTime<chrono::Utc>,
}

/// Discord ids are never zero, and serenity panics when handed one.
fn snowflake(key: &str) -> anyhow::Result<NonZeroU64> {
    parse_required_env_var(key)
}

impl Config {
    pub fn from_environment() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: required_env_var("TOKEN")?,
            owners: required_env_var("OWNERS")?
                .split(',')
                .map(|x| Ok(x.trim().parse()?))
                .collect::<anyhow::Result<_>>()?,

            guild: GuildId::from(snowflake("GUILD")?),
            role_staff: RoleId::from(snowflake("ROLE_STAFF")?),
            role_customer: RoleId::from(snowflake("ROLE_CUSTOMER")?),
            category_tickets: ChannelId::from(snowflake("CATEGORY_TICKETS")?),
            channel_orders: parse_optional_env_var::<_, NonZeroU64>("CHANNEL_ORDERS")?
                .map(ChannelId::from),
            channel_feedback: ChannelId::from(snowflake("CHANNEL_FEEDBACK")?),
            payment_address: required_env_var("PAYMENT_ADDRESS")?,
            cooldown: Duration::from_secs(parse_env_var_or("COOLDOWN_SECS", 300)?),
            directory_timeout: Duration::from_secs(parse_env_var_or("DIRECTORY_TIMEOUT_SECS", 10)?),
            api_port: parse_env_var_or("API_PORT", 3000)?,
            time_started: chrono::Utc::now(),
        })
    }

    pub fn intake_config(&self) -> IntakeConfig {
        IntakeConfig {
            cooldown_window: self.cooldown,
            call_timeout: self.directory_timeout,
            order_log: self.channel_orders.map(|x| ChannelHandle(x.to_string())),
            staff_role: self.role_staff.to_string(),
        }
    }

    pub async fn post_feedback<F>(&self, http: &Http, build_embed: F) -> anyhow::Result<Message>
    where
        F: FnOnce(CreateEmbed) -> CreateEmbed + Send + Sync,
    {
        self.guild.send_embed(http, self.channel_feedback, build_embed).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // the only test in this crate touching these variables, as the environment is process wide
    #[test]
    fn test_channel_orders_from_environment() {
        for (key, value) in [
            ("TOKEN", "token"),
            ("OWNERS", "1,2"),
            ("GUILD", "10"),
            ("ROLE_STAFF", "11"),
            ("ROLE_CUSTOMER", "12"),
            ("CATEGORY_TICKETS", "13"),
            ("CHANNEL_FEEDBACK", "14"),
            ("PAYMENT_ADDRESS", "pay@example.com"),
        ] {
            std::env::set_var(key, value);
        }

        std::env::set_var("CHANNEL_ORDERS", "12345x");
        assert!(Config::from_environment().is_err());

        std::env::set_var("CHANNEL_ORDERS", "0");
        assert!(Config::from_environment().is_err());

        std::env::set_var("CHANNEL_ORDERS", "15");
        let config = Config::from_environment().unwrap();
        assert_eq!(config.channel_orders, Some(ChannelId::new(15)));
        assert_eq!(config.intake_config().order_log, Some(ChannelHandle("15".into())));

        std::env::remove_var("CHANNEL_ORDERS");
        let config = Config::from_environment().unwrap();
        assert_eq!(config.channel_orders, None);
        assert_eq!(config.cooldown, Duration::from_secs(300));
        assert_eq!(config.owners.len(), 2);
    }
}

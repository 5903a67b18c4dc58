use anyhow::{anyhow, Context, Result};
use std::env;

/// return with an error value immediately.
#[macro_export]
macro_rules! abort_with {
    ($err:literal) => {
        return Err(UserErr::other($err).into())
    };
    ($err:expr) => {
        return Err($err.into())
    };
}

/// If the result of the given code is an error, log it nicely. Otherwise just ignore the value.
#[macro_export]
macro_rules! log_error {
    ($e:expr) => {
        if let Err(e) = $e {
            let e = anyhow::anyhow!(e);
            tracing::error!(
                error.message = %&e,
                error.root_cause = %e.root_cause(),
                "{:?}",
                e
            );
        }
    };
    ($context:expr, $e:expr $(,)?) => {
        if let Err(e) = $e {
            let e = ::anyhow::anyhow!(e).context($context);
            tracing::error!(
                error.message = %&e,
                error.root_cause = %e.root_cause(),
                "{:?}",
                e
            );
        }
    };
}

pub fn ellipsis_text(text: &str, max_len: usize) -> String {
    if text.len() + 3 > max_len {
        let mut cutoff = max_len - 3;
        while !text.is_char_boundary(cutoff) {
            cutoff -= 1;
        }
        format!("{}...", text.split_at(cutoff).0)
    } else {
        text.to_string()
    }
}

/// Get an environment variable, returning an Err with a
/// nice error message mentioning the missing variable in case the value is not found.
pub fn required_env_var(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("Missing environment variable {}", key))
}

/// like [required_env_var], but also uses FromStr to parse the value.
pub fn parse_required_env_var<E: Into<anyhow::Error>, T: std::str::FromStr<Err = E>>(
    key: &str,
) -> Result<T> {
    required_env_var(key)?
        .parse()
        .map_err(|e: E| anyhow!(e))
        .with_context(|| format!("Failed to parse env-var {}", key))
}

/// like [parse_required_env_var], but falls back to `default` when the variable is not set.
/// A value that is set but can't be parsed is still an error.
pub fn parse_env_var_or<E: Into<anyhow::Error>, T: std::str::FromStr<Err = E>>(
    key: &str,
    default: T,
) -> Result<T> {
    match env::var(key) {
        Ok(_) => parse_required_env_var(key),
        Err(_) => Ok(default),
    }
}

/// like [parse_required_env_var], but an unset (or empty) variable is `None`.
/// A value that is set but can't be parsed is still an error.
pub fn parse_optional_env_var<E: Into<anyhow::Error>, T: std::str::FromStr<Err = E>>(
    key: &str,
) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(_) => parse_required_env_var(key).map(Some),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("Failed to read env-var {}", key)),
    }
}

/// Format a 1-5 rating as stars, like `⭐⭐⭐`.
pub fn format_rating(rating: u8) -> String {
    "⭐".repeat(usize::from(rating.clamp(1, 5)))
}

/// Build the URL of a QR code image encoding `data`.
pub fn qr_code_url(data: &str) -> Result<url::Url> {
    url::Url::parse_with_params(
        "https://api.qrserver.com/v1/create-qr-code/",
        &[("size", "300x300"), ("data", data)],
    )
    .context("Failed to build QR code url")
}

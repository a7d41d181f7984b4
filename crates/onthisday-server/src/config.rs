//! Server configuration loaded from environment variables.
//!
//! Every variable is optional. Unparseable values are errors rather than
//! silently falling back to the default.

use std::time::Duration;

use crate::history::DEFAULT_UPSTREAM_URL;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// Base URL of the upstream monthly history feed.
    pub history_base_url: String,
    /// Request timeout for the upstream feed.
    pub upstream_timeout: Duration,
    /// Maximum number of events returned per day.
    pub max_events: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 5001,
            history_base_url: DEFAULT_UPSTREAM_URL.to_owned(),
            upstream_timeout: Duration::from_secs(10),
            max_events: 5,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Optional variables:
    /// - `HOST` -- bind address (default `0.0.0.0`)
    /// - `PORT` -- listen port (default `5001`)
    /// - `HISTORY_BASE_URL` -- upstream feed base URL
    /// - `UPSTREAM_TIMEOUT_MS` -- upstream request timeout (default 10000)
    /// - `MAX_EVENTS` -- events kept per day after ranking (default 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or("PORT", lookup("PORT"), defaults.port)?;
        let history_base_url = lookup("HISTORY_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or(defaults.history_base_url);
        let timeout_ms = parse_or("UPSTREAM_TIMEOUT_MS", lookup("UPSTREAM_TIMEOUT_MS"), 10_000_u64)?;
        let max_events = parse_or("MAX_EVENTS", lookup("MAX_EVENTS"), defaults.max_events)?;

        if max_events == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_EVENTS",
                reason: String::from("must be at least 1"),
            });
        }

        Ok(Self {
            host,
            port,
            history_base_url,
            upstream_timeout: Duration::from_millis(timeout_ms),
            max_events,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("{value:?}: {e}"),
        })
    })
}

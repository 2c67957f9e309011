use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime knobs, loaded from the environment with logged fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    /// Channel buffer size for every resource actor.
    pub channel_buffer: usize,
    /// Lifetime of issued bearer tokens, in seconds.
    pub token_ttl_secs: i64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            channel_buffer: try_load("CAFE_CHANNEL_BUFFER", "32"),
            token_ttl_secs: try_load("CAFE_TOKEN_TTL_SECS", "604800"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_buffer: 32,
            token_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

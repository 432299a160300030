//! Server configuration from the environment

use crate::polish::DEFAULT_POLISH_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8787;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Built browser client, served with an `index.html` fallback
    pub static_dir: Option<PathBuf>,
    pub polish_enabled: bool,
    pub polish_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            polish_enabled: true,
            polish_timeout: DEFAULT_POLISH_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = get("HUDDLE_PORT")
            .or_else(|| get("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let polish_enabled = get("HUDDLE_POLISH")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.polish_enabled);

        let polish_timeout = get("HUDDLE_POLISH_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map_or(defaults.polish_timeout, Duration::from_millis);

        Self {
            port,
            static_dir: get("HUDDLE_STATIC_DIR").map(PathBuf::from),
            polish_enabled,
            polish_timeout,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

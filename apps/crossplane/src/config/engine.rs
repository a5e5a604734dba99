//! Engine configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use time::Duration;

use crate::error::AppError;

pub const DEFAULT_GRID_ID: &str = "shared-grid";
pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";
pub const DEFAULT_PROFANITY_URL: &str = "https://www.purgomalum.com/service/containsprofanity";

/// Where the shared grid document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Redis { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub grid_id: String,
    pub store: StoreKind,
    pub cooldown: Duration,
    pub sync_debounce: StdDuration,
    pub dictionary_url: String,
    pub profanity_url: String,
    pub validation_timeout: StdDuration,
    /// `None` keeps preferences in memory.
    pub prefs_path: Option<PathBuf>,
    pub prefs_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_id: DEFAULT_GRID_ID.to_string(),
            store: StoreKind::Memory,
            cooldown: Duration::seconds(15),
            sync_debounce: StdDuration::from_millis(1000),
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
            profanity_url: DEFAULT_PROFANITY_URL.to_string(),
            validation_timeout: StdDuration::from_millis(5000),
            prefs_path: None,
            prefs_ttl: Duration::days(30),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unset and empty variables
    /// take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let store = match var("CROSSPLANE_STORE").as_deref().map(str::trim) {
            None | Some("memory") => StoreKind::Memory,
            Some("redis") => StoreKind::Redis {
                url: var("REDIS_URL").ok_or_else(|| {
                    AppError::config("Required environment variable 'REDIS_URL' is not set")
                })?,
            },
            Some(other) => {
                return Err(AppError::config(format!(
                    "Invalid value for 'CROSSPLANE_STORE': '{other}' (expected 'memory' or 'redis')"
                )))
            }
        };

        let cooldown_secs: i64 = parse_or(&var, "CROSSPLANE_COOLDOWN_SECS", 15)?;
        let debounce_ms: u64 = parse_or(&var, "CROSSPLANE_SYNC_DEBOUNCE_MS", 1000)?;
        let timeout_ms: u64 = parse_or(&var, "CROSSPLANE_VALIDATION_TIMEOUT_MS", 5000)?;
        let ttl_days: i64 = parse_or(&var, "CROSSPLANE_PREFS_TTL_DAYS", 30)?;

        if cooldown_secs < 0 {
            return Err(AppError::config(
                "CROSSPLANE_COOLDOWN_SECS must not be negative",
            ));
        }
        if ttl_days <= 0 {
            return Err(AppError::config("CROSSPLANE_PREFS_TTL_DAYS must be positive"));
        }

        Ok(Self {
            grid_id: var("CROSSPLANE_GRID_ID").unwrap_or(defaults.grid_id),
            store,
            cooldown: Duration::seconds(cooldown_secs),
            sync_debounce: StdDuration::from_millis(debounce_ms),
            dictionary_url: var("DICTIONARY_API_URL").unwrap_or(defaults.dictionary_url),
            profanity_url: var("PROFANITY_API_URL").unwrap_or(defaults.profanity_url),
            validation_timeout: StdDuration::from_millis(timeout_ms),
            prefs_path: var("CROSSPLANE_PREFS_PATH").map(PathBuf::from),
            prefs_ttl: Duration::days(ttl_days),
        })
    }
}

fn parse_or<T, F>(var: &F, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|err| {
            AppError::config(format!("Invalid value for '{name}': '{raw}' ({err})"))
        }),
    }
}

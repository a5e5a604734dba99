//! Session preference storage and the counters kept in it.

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::domain::SessionCounters;
use crate::error::AppError;

pub const LAST_PLACED_KEY: &str = "crossplane.lastPlacedTime";
pub const WORDS_PLACED_KEY: &str = "crossplane.wordsPlacedCount";

/// Small string key-value store with per-key expiry.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Value for `key`, or `None` if missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError>;
}

/// Restore counters. Unparseable values are treated as absent.
pub async fn load_counters(store: &dyn PreferenceStore) -> Result<SessionCounters, AppError> {
    let last_placed = store
        .get(LAST_PLACED_KEY)
        .await?
        .and_then(|raw| match parse_millis(&raw) {
            Some(ts) => Some(ts),
            None => {
                warn!(key = LAST_PLACED_KEY, value = %raw, "Ignoring unparseable preference");
                None
            }
        });
    let words_placed = store
        .get(WORDS_PLACED_KEY)
        .await?
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(0);

    Ok(SessionCounters {
        last_placed,
        words_placed,
    })
}

pub async fn save_counters(
    store: &dyn PreferenceStore,
    counters: SessionCounters,
    ttl: Duration,
) -> Result<(), AppError> {
    if let Some(ts) = counters.last_placed {
        store.set(LAST_PLACED_KEY, &to_millis(ts).to_string(), ttl).await?;
    }
    store
        .set(WORDS_PLACED_KEY, &counters.words_placed.to_string(), ttl)
        .await
}

pub fn to_millis(ts: OffsetDateTime) -> i64 {
    (ts.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_millis(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok()
}

fn parse_millis(raw: &str) -> Option<OffsetDateTime> {
    raw.trim().parse::<i64>().ok().and_then(from_millis)
}

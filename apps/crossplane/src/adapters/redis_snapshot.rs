//! Redis-backed snapshot store.
//!
//! The document lives under `crossplane:grid:{id}`. Every save writes it and
//! publishes the same JSON on `crossplane:grid:{id}:changed` in one atomic
//! pipeline, so subscribers never need a follow-up read.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use rand::random;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use time::OffsetDateTime;
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::adapters::document;
use crate::domain::Cell;
use crate::error::AppError;
use crate::repos::snapshots::{FeedSender, SnapshotFeed, SnapshotStore};

// Subscriber retry configuration (background task)
const INITIAL_RETRY_DELAY_SECS: u64 = 1;
const MAX_RETRY_DELAY_SECS: u64 = 60;
const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
const JITTER_PERCENT: f64 = 0.2;

// Save retry configuration (push path)
const SAVE_MAX_ATTEMPTS: u32 = 3;
const SAVE_INITIAL_RETRY_DELAY_MS: u64 = 50;
const SAVE_MAX_RETRY_DELAY_MS: u64 = 200;

pub fn document_key(grid_id: &str) -> String {
    format!("crossplane:grid:{grid_id}")
}

pub fn change_channel(grid_id: &str) -> String {
    format!("crossplane:grid:{grid_id}:changed")
}

pub struct RedisSnapshotStore {
    client: Client,
    // Connected on first use so an unreachable server surfaces as a failed
    // load or save rather than a failed start.
    manager: OnceCell<ConnectionManager>,
    key: String,
    channel: String,
}

impl RedisSnapshotStore {
    pub fn new(redis_url: &str, grid_id: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        Ok(Self {
            client,
            manager: OnceCell::new(),
            key: document_key(grid_id),
            channel: change_channel(grid_id),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, AppError> {
        self.manager
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|err| {
                        AppError::store_with_source(
                            "Unable to initialize Redis connection manager",
                            err,
                        )
                    })?;
                info!(key = %self.key, "Connected to Redis snapshot store");
                Ok::<_, AppError>(manager)
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn save(&self, cells: &[Cell]) -> Result<(), AppError> {
        let encoded = document::encode(cells, OffsetDateTime::now_utc())?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let save_res = match self.connection().await {
                Ok(mut conn) => redis::pipe()
                    .atomic()
                    .set(&self.key, &encoded)
                    .ignore()
                    .publish(&self.channel, &encoded)
                    .ignore()
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(|err| {
                        AppError::store_with_source("Failed to save grid document to Redis", err)
                    }),
                Err(err) => Err(err),
            };

            match save_res {
                Ok(()) => return Ok(()),
                Err(app_err) => {
                    if attempt >= SAVE_MAX_ATTEMPTS || !is_transient_error(&app_err) {
                        return Err(app_err);
                    }

                    let delay_ms = SAVE_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(SAVE_MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %app_err,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "Redis save failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn load(&self) -> Result<Vec<Cell>, AppError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(&self.key).await?;
        match raw {
            Some(raw) => document::decode(&raw),
            None => Ok(Vec::new()),
        }
    }

    async fn subscribe(&self) -> Result<SnapshotFeed, AppError> {
        let (tx, feed) = SnapshotFeed::channel();
        let source = Subscription {
            client: self.client.clone(),
            key: self.key.clone(),
            channel: self.channel.clone(),
        };
        tokio::spawn(async move {
            source.run_with_retry(tx).await;
        });
        Ok(feed)
    }
}

struct Subscription {
    client: Client,
    key: String,
    channel: String,
}

impl Subscription {
    async fn run_with_retry(self, tx: FeedSender) {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.run(&tx).await {
                Ok(()) => {
                    debug!(channel = %self.channel, "Redis subscription closed by subscriber");
                    break;
                }
                Err(err) => {
                    if !is_transient_error(&err) {
                        error!(
                            error = %err,
                            attempt,
                            "Redis subscription failed with permanent error, exiting"
                        );
                        break;
                    }

                    let delay = calculate_retry_delay(attempt);
                    warn!(
                        error = %err,
                        attempt,
                        retry_delay_secs = delay.as_secs_f64(),
                        "Redis subscription failed, retrying"
                    );
                    tokio::select! {
                        _ = tx.closed() => break,
                        _ = sleep(delay) => {}
                    }

                    if attempt >= 20 {
                        attempt = 10;
                    }
                }
            }
        }
    }

    /// One subscription session. `Ok` means the feed was dropped.
    async fn run(&self, tx: &FeedSender) -> Result<(), AppError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;
        info!(channel = %self.channel, "Redis subscription established");

        // Catch up on saves made while no subscription was live.
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let current: Option<String> = conn.get(&self.key).await?;
        if let Some(raw) = current {
            if !forward(tx, &raw).await {
                return Ok(());
            }
        }

        let mut stream = pubsub.on_message();
        loop {
            tokio::select! {
                _ = tx.closed() => return Ok(()),
                next = stream.next() => {
                    let Some(msg) = next else {
                        return Err(AppError::store("Redis subscription stream ended"));
                    };
                    let Ok(payload) = msg.get_payload::<String>() else {
                        continue;
                    };
                    if !forward(tx, &payload).await {
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn forward(tx: &FeedSender, raw: &str) -> bool {
    match document::decode(raw) {
        Ok(cells) => tx.send(cells).await,
        Err(err) => {
            warn!(error = %err, "Skipping undecodable grid document");
            true
        }
    }
}

fn is_transient_error(err: &AppError) -> bool {
    if let AppError::Config { .. } = err {
        return false;
    }

    let error_msg = err.to_string().to_lowercase();

    if error_msg.contains("authentication failed")
        || error_msg.contains("invalid redis_url")
        || error_msg.contains("noauth")
        || error_msg.contains("wrongpass")
    {
        return false;
    }

    if let Some(source) = StdError::source(err) {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
            match io_err.kind() {
                std::io::ErrorKind::PermissionDenied => return false,
                std::io::ErrorKind::Unsupported => return false,
                _ => return true,
            }
        }
    }

    true
}

fn calculate_retry_delay(attempt: u32) -> Duration {
    let base_delay =
        INITIAL_RETRY_DELAY_SECS as f64 * RETRY_DELAY_MULTIPLIER.powi(attempt as i32 - 1);
    let capped_delay = base_delay.min(MAX_RETRY_DELAY_SECS as f64);

    let jitter_range = capped_delay * JITTER_PERCENT;
    let jitter = (random::<f64>() * 2.0 - 1.0) * jitter_range;
    let final_delay = (capped_delay + jitter).max(0.1);

    Duration::from_secs_f64(final_delay)
}

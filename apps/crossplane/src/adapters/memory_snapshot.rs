//! In-process snapshot store. Clones share one document, so several
//! sessions in the same process behave like clients of one remote store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::adapters::document;
use crate::domain::Cell;
use crate::error::AppError;
use crate::repos::snapshots::{FeedSender, SnapshotFeed, SnapshotStore};

const CHANGE_BUFFER: usize = 64;

#[derive(Debug)]
struct Shared {
    document: Mutex<Option<String>>,
    changes: broadcast::Sender<String>,
    saves: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct MemorySnapshotStore {
    shared: Arc<Shared>,
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            shared: Arc::new(Shared {
                document: Mutex::new(None),
                changes,
                saves: AtomicUsize::new(0),
            }),
        }
    }

    /// Store pre-populated with `cells`, as if another client had saved them.
    pub fn with_cells(cells: &[Cell]) -> Result<Self, AppError> {
        let store = Self::new();
        *store.shared.document.lock() = Some(document::encode(cells, OffsetDateTime::now_utc())?);
        Ok(store)
    }

    /// Number of successful `save` calls across all clones.
    pub fn save_count(&self) -> usize {
        self.shared.saves.load(Ordering::SeqCst)
    }

    /// Raw JSON document, if one was ever written.
    pub fn raw_document(&self) -> Option<String> {
        self.shared.document.lock().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, cells: &[Cell]) -> Result<(), AppError> {
        let raw = document::encode(cells, OffsetDateTime::now_utc())?;
        *self.shared.document.lock() = Some(raw.clone());
        self.shared.saves.fetch_add(1, Ordering::SeqCst);
        // No receivers is fine: nobody is subscribed yet.
        let _ = self.shared.changes.send(raw);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Cell>, AppError> {
        match self.raw_document() {
            Some(raw) => document::decode(&raw),
            None => Ok(Vec::new()),
        }
    }

    async fn subscribe(&self) -> Result<SnapshotFeed, AppError> {
        let (tx, feed) = SnapshotFeed::channel();
        // Subscribe before reading the current document so no save slips
        // between the two.
        let mut changes = self.shared.changes.subscribe();
        let current = self.raw_document();

        tokio::spawn(async move {
            if let Some(raw) = current {
                if !forward(&tx, &raw).await {
                    return;
                }
            }
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    msg = changes.recv() => match msg {
                        Ok(raw) => {
                            if !forward(&tx, &raw).await {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Memory snapshot subscriber lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });

        Ok(feed)
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

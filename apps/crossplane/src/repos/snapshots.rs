//! Remote snapshot storage for the shared grid.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::domain::Cell;
use crate::error::AppError;

/// Whole-document storage of the confirmed cells, shared by every client.
///
/// Implementations overwrite the document on `save` and notify every live
/// subscription, the saving client's own included.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, cells: &[Cell]) -> Result<(), AppError>;

    /// Current document. An absent document loads as an empty list.
    async fn load(&self) -> Result<Vec<Cell>, AppError>;

    /// Start receiving decoded snapshots. The current document, if any, is
    /// delivered first.
    async fn subscribe(&self) -> Result<SnapshotFeed, AppError>;
}

/// Receiving end of a subscription. Dropping it stops the producer.
#[derive(Debug)]
pub struct SnapshotFeed {
    rx: mpsc::Receiver<Vec<Cell>>,
    _guard: DropGuard,
}

/// Producer half handed to the adapter's forwarding task.
#[derive(Debug, Clone)]
pub struct FeedSender {
    tx: mpsc::Sender<Vec<Cell>>,
    cancel: CancellationToken,
}

pub const FEED_CAPACITY: usize = 16;

impl SnapshotFeed {
    pub fn channel() -> (FeedSender, SnapshotFeed) {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let cancel = CancellationToken::new();
        let feed = SnapshotFeed {
            rx,
            _guard: cancel.clone().drop_guard(),
        };
        (FeedSender { tx, cancel }, feed)
    }

    /// Next snapshot, or `None` once the producer has stopped.
    pub async fn next(&mut self) -> Option<Vec<Cell>> {
        self.rx.recv().await
    }
}

impl FeedSender {
    /// Returns false once the feed is gone.
    pub async fn send(&self, cells: Vec<Cell>) -> bool {
        self.tx.send(cells).await.is_ok()
    }

    /// Resolves when the subscriber drops its feed.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}

//! Memory snapshot store with switchable failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use crossplane::adapters::MemorySnapshotStore;
use crossplane::domain::Cell;
use crossplane::repos::{SnapshotFeed, SnapshotStore};
use crossplane::AppError;
use tokio::sync::{mpsc, Notify};

pub struct FlakyStore {
    inner: MemorySnapshotStore,
    fail_load: AtomicBool,
    fail_subscribe: AtomicBool,
    save_failures: AtomicUsize,
    save_attempts: AtomicUsize,
    held_saves: Option<(mpsc::UnboundedSender<Vec<Cell>>, Arc<Notify>)>,
}

impl FlakyStore {
    pub fn new(inner: MemorySnapshotStore) -> Self {
        Self {
            inner,
            fail_load: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            save_failures: AtomicUsize::new(0),
            save_attempts: AtomicUsize::new(0),
            held_saves: None,
        }
    }

    pub fn failing_load(self) -> Self {
        self.fail_load.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_subscribe(self) -> Self {
        self.fail_subscribe.store(true, Ordering::SeqCst);
        self
    }

    /// Fail the next `n` saves.
    pub fn failing_saves(self, n: usize) -> Self {
        self.save_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Publish each saved snapshot on the returned receiver as soon as
    /// `save` is called, and hold the acknowledgement until `gate` is
    /// notified.
    pub fn echoing_before_ack(
        mut self,
        gate: Arc<Notify>,
    ) -> (Self, mpsc::UnboundedReceiver<Vec<Cell>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.held_saves = Some((tx, gate));
        (self, rx)
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemorySnapshotStore {
        &self.inner
    }
}

#[async_trait]
impl SnapshotStore for FlakyStore {
    async fn save(&self, cells: &[Cell]) -> Result<(), AppError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .save_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AppError::store("injected save failure"));
        }
        if let Some((echo, gate)) = &self.held_saves {
            let _ = echo.send(cells.to_vec());
            gate.notified().await;
        }
        self.inner.save(cells).await
    }

    async fn load(&self) -> Result<Vec<Cell>, AppError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(AppError::store("injected load failure"));
        }
        self.inner.load().await
    }

    async fn subscribe(&self) -> Result<SnapshotFeed, AppError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(AppError::store("injected subscribe failure"));
        }
        self.inner.subscribe().await
    }
}

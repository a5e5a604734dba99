//! Keeps the local grid and the shared remote document converging.
//!
//! Local changes are pushed as whole snapshots after a quiet period. Remote
//! snapshots replace the local map when they differ by value, and cancel any
//! push that was waiting, so an ingested snapshot is never echoed back.
//! A snapshot equal to the last one exchanged with the remote (adopted,
//! ingested or pushed) or to the one currently being pushed carries nothing
//! new and is ignored; this keeps the echo of our own push, even one that
//! arrives before the store acknowledges the save, and the subscription
//! catch-up read from undoing local edits made in the meantime. Concurrent writers resolve as
//! whole-document last-writer-wins.

use std::collections::HashMap;
use std::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{seed_cells, Cell, ChangeOrigin, Coord, GridEvent, GridStore, Letter};
use crate::error::AppError;
use crate::repos::snapshots::{SnapshotFeed, SnapshotStore};

/// How the grid was initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A non-empty remote document was adopted.
    Adopted { cells: usize },
    /// The remote document was empty; the seed word was written to it.
    Seeded,
    /// The remote store could not be read; the seed word is local only.
    SeededOffline,
}

pub struct SyncReconciler {
    grid: Arc<GridStore>,
    store: Arc<dyn SnapshotStore>,
    debounce: Duration,
    // Set when the bootstrap seed could not be pushed; the push loop starts
    // with a push scheduled.
    push_owed: AtomicBool,
    last_synced: Mutex<Vec<Cell>>,
    // Snapshot handed to `save` and not yet acknowledged.
    outgoing: Mutex<Option<Vec<Cell>>>,
}

/// Running push and pull loops.
pub struct SyncHandle {
    cancel: CancellationToken,
    push: JoinHandle<()>,
    pull: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop both loops. A push still waiting on its debounce is sent first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.push.await {
            warn!(error = %err, "Push loop ended abnormally");
        }
        if let Some(pull) = self.pull {
            if let Err(err) = pull.await {
                warn!(error = %err, "Pull loop ended abnormally");
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.pull.as_ref().is_some_and(|pull| !pull.is_finished())
    }
}

impl SyncReconciler {
    pub fn new(grid: Arc<GridStore>, store: Arc<dyn SnapshotStore>, debounce: Duration) -> Self {
        Self {
            grid,
            store,
            debounce,
            push_owed: AtomicBool::new(false),
            last_synced: Mutex::new(Vec::new()),
            outgoing: Mutex::new(None),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// One remote load, then adopt it or fall back to the seed word.
    ///
    /// Never fails: an unreadable store leaves the session playable offline,
    /// and such a client never writes the seed over the shared document.
    pub async fn bootstrap(&self) -> BootstrapOutcome {
        match self.store.load().await {
            Ok(cells) if !cells.is_empty() => {
                let count = cells.len();
                *self.last_synced.lock() = cells.clone();
                self.grid.replace_all(cells, ChangeOrigin::Remote);
                info!(cells = count, "Adopted remote grid");
                BootstrapOutcome::Adopted { cells: count }
            }
            Ok(_) => {
                self.grid.replace_all(seed_cells(), ChangeOrigin::Local);
                if let Err(err) = self.push_now().await {
                    warn!(error = %err, "Unable to publish seed grid, will retry");
                    self.push_owed.store(true, Ordering::Release);
                }
                info!("Remote grid empty, seeded default word");
                BootstrapOutcome::Seeded
            }
            Err(err) => {
                warn!(error = %err, "Unable to load remote grid, playing offline");
                self.grid.replace_all(seed_cells(), ChangeOrigin::Bootstrap);
                BootstrapOutcome::SeededOffline
            }
        }
    }

    /// Apply a remote snapshot. Returns whether the local map changed.
    pub fn ingest(&self, cells: Vec<Cell>) -> bool {
        if self.grid.same_contents(&cells) {
            debug!(cells = cells.len(), "Remote snapshot matches local grid");
            *self.last_synced.lock() = cells;
            return false;
        }
        if self.already_seen(&cells) {
            debug!(cells = cells.len(), "Remote snapshot already seen");
            return false;
        }
        let count = cells.len();
        *self.last_synced.lock() = cells.clone();
        self.grid.replace_all(cells, ChangeOrigin::Remote);
        debug!(cells = count, "Applied remote snapshot");
        true
    }

    /// Write the current confirmed cells to the remote document.
    pub async fn push_now(&self) -> Result<(), AppError> {
        let cells = self.grid.cells();
        *self.outgoing.lock() = Some(cells.clone());
        let saved = self.store.save(&cells).await;
        *self.outgoing.lock() = None;
        saved?;
        debug!(cells = cells.len(), "Pushed grid snapshot");
        *self.last_synced.lock() = cells;
        Ok(())
    }

    fn already_seen(&self, cells: &[Cell]) -> bool {
        if same_snapshot(&self.last_synced.lock(), cells) {
            return true;
        }
        self.outgoing
            .lock()
            .as_deref()
            .is_some_and(|outgoing| same_snapshot(outgoing, cells))
    }

    /// Spawn the push loop and, if the store accepts a subscription, the
    /// pull loop.
    pub async fn start(self: &Arc<Self>) -> SyncHandle {
        let cancel = CancellationToken::new();

        let events = self.grid.subscribe();
        let push = tokio::spawn(self.clone().run_push_loop(events, cancel.child_token()));

        let pull = match self.store.subscribe().await {
            Ok(feed) => Some(tokio::spawn(
                self.clone().run_pull_loop(feed, cancel.child_token()),
            )),
            Err(err) => {
                warn!(error = %err, "Remote subscription unavailable, running without live updates");
                None
            }
        };

        SyncHandle { cancel, push, pull }
    }

    async fn run_push_loop(
        self: Arc<Self>,
        mut events: watch::Receiver<GridEvent>,
        cancel: CancellationToken,
    ) {
        let mut deadline = self
            .push_owed
            .swap(false, Ordering::AcqRel)
            .then(|| Instant::now() + self.debounce);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = events.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let event = *events.borrow_and_update();
                    match event.origin {
                        ChangeOrigin::Local => {
                            deadline = Some(Instant::now() + self.debounce);
                        }
                        ChangeOrigin::Remote => {
                            if deadline.take().is_some() {
                                debug!(version = event.version, "Remote snapshot superseded scheduled push");
                            }
                        }
                        ChangeOrigin::Bootstrap => {}
                    }
                }
                _ = wait_until(deadline) => {
                    deadline = None;
                    if let Err(err) = self.push_now().await {
                        warn!(error = %err, "Grid push failed, retrying after next debounce");
                        deadline = Some(Instant::now() + self.debounce);
                    }
                }
            }
        }

        // A local change that raced the cancellation still counts.
        if events.has_changed().unwrap_or(false)
            && events.borrow_and_update().origin == ChangeOrigin::Local
        {
            deadline = Some(Instant::now());
        }
        if deadline.is_some() {
            if let Err(err) = self.push_now().await {
                warn!(error = %err, "Final grid push failed");
            }
        }
    }

    async fn run_pull_loop(self: Arc<Self>, mut feed: SnapshotFeed, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                next = feed.next() => match next {
                    Some(cells) => {
                        self.ingest(cells);
                    }
                    None => {
                        warn!("Remote snapshot feed ended");
                        break;
                    }
                },
            }
        }
    }
}

/// Value equality of two snapshots, ignoring order and definitions.
fn same_snapshot(a: &[Cell], b: &[Cell]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let index: HashMap<Coord, (Letter, bool)> = a
        .iter()
        .map(|cell| (cell.coord, (cell.letter, cell.confirmed)))
        .collect();
    index.len() == b.len()
        && b.iter()
            .all(|cell| index.get(&cell.coord) == Some(&(cell.letter, cell.confirmed)))
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => future::pending().await,
    }
}

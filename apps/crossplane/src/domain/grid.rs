//! Sparse, unbounded store of confirmed cells.
//!
//! Every mutation happens under one write lock and bumps a version, so a
//! reader sees either the whole old map or the whole new one. Dependents
//! (sync, rendering) learn about changes through a watch channel of
//! [`GridEvent`]s instead of polling.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::domain::barrier::is_barrier_at;
use crate::domain::cell::{Cell, Letter};
use crate::domain::coords::Coord;
use crate::errors::domain::{ConflictKind, DomainError};

/// Where a mutation came from. Drives push scheduling in the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Player action on this client; schedules a debounced push.
    Local,
    /// Ingested remote snapshot; never pushed back.
    Remote,
    /// Offline seed or initial state; never pushed.
    Bootstrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEvent {
    pub version: u64,
    pub origin: ChangeOrigin,
}

#[derive(Debug, Default)]
struct GridInner {
    cells: HashMap<Coord, Cell>,
    version: u64,
}

#[derive(Debug)]
pub struct GridStore {
    inner: RwLock<GridInner>,
    events: watch::Sender<GridEvent>,
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GridStore {
    pub fn new() -> Self {
        let (events, _) = watch::channel(GridEvent {
            version: 0,
            origin: ChangeOrigin::Bootstrap,
        });
        Self {
            inner: RwLock::new(GridInner::default()),
            events,
        }
    }

    pub fn get(&self, c: Coord) -> Option<Cell> {
        self.inner.read().cells.get(&c).cloned()
    }

    pub fn letter_at(&self, c: Coord) -> Option<Letter> {
        self.inner.read().cells.get(&c).map(|cell| cell.letter)
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.inner.read().cells.contains_key(&c)
    }

    pub fn is_occupiable(&self, c: Coord) -> bool {
        !is_barrier_at(c)
    }

    /// Insert or overwrite the entry at `c`. `confirmed == false` removes it,
    /// since unconfirmed letters never live in the store. Callers enforce the
    /// never-overwrite-a-confirmed-letter rule.
    pub fn place(&self, c: Coord, letter: Letter, confirmed: bool) {
        if confirmed {
            self.mutate(ChangeOrigin::Local, |cells| {
                cells.insert(c, Cell::confirmed(c, letter));
                true
            });
        } else {
            self.remove(c);
        }
    }

    /// Insert a batch of cells as one atomic change. Unconfirmed entries are
    /// skipped. Every target must still be empty: if any is already filled
    /// nothing is written and the batch fails with `GridChanged`. Returns how
    /// many cells were written.
    pub fn place_word(&self, word: Vec<Cell>) -> Result<usize, DomainError> {
        let word: Vec<Cell> = word.into_iter().filter(|cell| cell.confirmed).collect();
        let mut taken = false;
        self.mutate(ChangeOrigin::Local, |cells| {
            taken = word.iter().any(|cell| cells.contains_key(&cell.coord));
            if taken {
                return false;
            }
            for cell in &word {
                cells.entry(cell.coord).or_insert_with(|| cell.clone());
            }
            !word.is_empty()
        });
        if taken {
            return Err(DomainError::conflict(
                ConflictKind::GridChanged,
                "The grid changed while checking. Try again.",
            ));
        }
        Ok(word.len())
    }

    /// Returns whether a cell was removed.
    pub fn remove(&self, c: Coord) -> bool {
        self.mutate(ChangeOrigin::Local, |cells| cells.remove(&c).is_some())
    }

    /// Atomically replace the whole map.
    pub fn replace_all<I>(&self, cells: I, origin: ChangeOrigin)
    where
        I: IntoIterator<Item = Cell>,
    {
        let next: HashMap<Coord, Cell> = cells
            .into_iter()
            .filter(|cell| cell.confirmed)
            .map(|cell| (cell.coord, cell))
            .collect();
        self.mutate(origin, move |cells| {
            *cells = next;
            true
        });
    }

    /// Value comparison against a candidate snapshot: same coordinates, same
    /// letters, same confirmed flags. Order and definitions do not matter.
    pub fn same_contents(&self, other: &[Cell]) -> bool {
        let candidate: HashMap<Coord, &Cell> = other
            .iter()
            .filter(|cell| cell.confirmed)
            .map(|cell| (cell.coord, cell))
            .collect();
        let inner = self.inner.read();
        inner.cells.len() == candidate.len()
            && inner.cells.iter().all(|(coord, cell)| {
                candidate
                    .get(coord)
                    .is_some_and(|theirs| cell.same_value(theirs))
            })
    }

    /// All cells, ordered by coordinate.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.inner.read().cells.values().cloned().collect();
        cells.sort_by_key(|cell| cell.coord);
        cells
    }

    pub fn confirmed_count(&self) -> usize {
        self.inner.read().cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().cells.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Receiver of change events. The current event counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<GridEvent> {
        self.events.subscribe()
    }

    fn mutate<F>(&self, origin: ChangeOrigin, f: F) -> bool
    where
        F: FnOnce(&mut HashMap<Coord, Cell>) -> bool,
    {
        let mut inner = self.inner.write();
        if !f(&mut inner.cells) {
            return false;
        }
        inner.version += 1;
        self.events.send_replace(GridEvent {
            version: inner.version,
            origin,
        });
        true
    }
}

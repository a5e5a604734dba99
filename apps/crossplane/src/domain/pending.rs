//! Letters typed but not yet submitted.

use crate::domain::barrier::is_barrier_at;
use crate::domain::cell::Letter;
use crate::domain::coords::Coord;
use crate::domain::grid::GridStore;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLetter {
    pub coord: Coord,
    pub letter: Letter,
}

/// What `set_char` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWrite {
    /// New entry added.
    Inserted,
    /// An earlier pending letter at the coordinate was replaced.
    Replaced,
    /// The coordinate already holds this letter as a confirmed cell; nothing
    /// was buffered and the caller should just move the cursor on.
    MatchesConfirmed,
}

/// Insertion-ordered buffer, unique by coordinate.
///
/// Invariants kept by `set_char`: every entry sits on an open cell and never
/// shadows a confirmed cell with a different letter. A buffer collected from
/// raw letters skips those checks; span discovery reports a barrier entry as
/// a gap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingWord {
    entries: Vec<PendingLetter>,
}

impl PendingWord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `letter` at `coord`.
    pub fn set_char(
        &mut self,
        grid: &GridStore,
        coord: Coord,
        letter: Letter,
    ) -> Result<PendingWrite, DomainError> {
        if is_barrier_at(coord) {
            return Err(DomainError::validation(
                ValidationKind::BarrierCell,
                "That square is blocked.",
            ));
        }

        if let Some(existing) = grid.letter_at(coord) {
            if existing == letter {
                return Ok(PendingWrite::MatchesConfirmed);
            }
            return Err(DomainError::validation(
                ValidationKind::LetterLocked,
                "Cannot change existing letters!",
            ));
        }

        match self.entries.iter_mut().find(|p| p.coord == coord) {
            Some(entry) => {
                entry.letter = letter;
                Ok(PendingWrite::Replaced)
            }
            None => {
                self.entries.push(PendingLetter { coord, letter });
                Ok(PendingWrite::Inserted)
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns whether an entry was removed.
    pub fn remove_at(&mut self, coord: Coord) -> bool {
        let before = self.entries.len();
        self.entries.retain(|p| p.coord != coord);
        self.entries.len() != before
    }

    /// Drop entries whose coordinate has since been confirmed on the grid.
    pub fn retain_unconfirmed(&mut self, grid: &GridStore) {
        self.entries.retain(|p| !grid.contains(p.coord));
    }

    pub fn get(&self, coord: Coord) -> Option<Letter> {
        self.entries
            .iter()
            .find(|p| p.coord == coord)
            .map(|p| p.letter)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.entries.iter().any(|p| p.coord == coord)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingLetter> {
        self.entries.iter()
    }
}

impl FromIterator<PendingLetter> for PendingWord {
    fn from_iter<I: IntoIterator<Item = PendingLetter>>(iter: I) -> Self {
        let mut word = PendingWord::new();
        for p in iter {
            word.entries.retain(|e| e.coord != p.coord);
            word.entries.push(p);
        }
        word
    }
}

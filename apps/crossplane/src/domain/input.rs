//! Cursor, typing direction and the pending buffer of one session.
//!
//! Remote grid replacement never touches this state; only player input does.

use crate::domain::barrier::is_barrier_at;
use crate::domain::cell::Letter;
use crate::domain::coords::{Coord, Direction};
use crate::domain::grid::GridStore;
use crate::domain::pending::{PendingWord, PendingWrite};
use crate::errors::domain::{DomainError, ValidationKind};

/// Arrow-key movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Left,
    Right,
    Up,
    Down,
}

impl Arrow {
    fn delta(self) -> (i32, i32) {
        match self {
            Arrow::Left => (-1, 0),
            Arrow::Right => (1, 0),
            Arrow::Up => (0, -1),
            Arrow::Down => (0, 1),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    selected: Option<Coord>,
    direction: Direction,
    entry_start: Option<Coord>,
    pending: PendingWord,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_start(&self) -> Option<Coord> {
        self.entry_start
    }

    pub fn pending(&self) -> &PendingWord {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingWord {
        &mut self.pending
    }

    /// Click on a cell. Re-selecting the current cell flips the direction;
    /// selecting a cell outside the pending buffer discards the buffer.
    pub fn select_cell(&mut self, c: Coord) -> Result<(), DomainError> {
        if is_barrier_at(c) {
            return Err(blocked());
        }
        if self.selected == Some(c) {
            self.direction = self.direction.toggled();
            return Ok(());
        }
        if !self.pending.contains(c) {
            self.pending.clear();
        }
        self.selected = Some(c);
        self.entry_start = Some(c);
        Ok(())
    }

    /// Stage `c` under the cursor and advance one step along the direction.
    ///
    /// Typing the letter a confirmed cell already holds just advances. The
    /// cursor stays put when the next cell is a barrier or past the plane edge.
    pub fn type_letter(&mut self, grid: &GridStore, c: char) -> Result<PendingWrite, DomainError> {
        let Some(at) = self.selected else {
            return Err(DomainError::validation(
                ValidationKind::NoSelection,
                "Select a square first.",
            ));
        };
        let letter = Letter::parse(c)?;
        let write = self.pending.set_char(grid, at, letter)?;
        self.advance(1);
        Ok(write)
    }

    /// Remove the pending letter under the cursor, or step back one cell and
    /// remove the pending letter there. Never moves before the entry start or
    /// onto a barrier. Returns whether anything changed.
    pub fn backspace(&mut self) -> bool {
        let (Some(at), Some(start)) = (self.selected, self.entry_start) else {
            return false;
        };
        if self.pending.remove_at(at) {
            return true;
        }
        if at == start {
            return false;
        }
        let Some(prev) = at.step(self.direction, -1) else {
            return false;
        };
        if is_barrier_at(prev) {
            return false;
        }
        self.selected = Some(prev);
        self.pending.remove_at(prev);
        true
    }

    /// Move the cursor one cell. Barriers and the plane edge stop it.
    pub fn move_selection(&mut self, arrow: Arrow) -> bool {
        let Some(at) = self.selected else {
            return false;
        };
        let (dx, dy) = arrow.delta();
        match at.offset(dx, dy) {
            Some(next) if !is_barrier_at(next) => {
                self.selected = Some(next);
                true
            }
            _ => false,
        }
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.toggled();
    }

    /// Discard the pending buffer; typing restarts from the cursor.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.entry_start = self.selected;
    }

    fn advance(&mut self, step: i32) {
        if let Some(next) = self
            .selected
            .and_then(|at| at.step(self.direction, step))
            .filter(|next| !is_barrier_at(*next))
        {
            self.selected = Some(next);
        }
    }
}

fn blocked() -> DomainError {
    DomainError::validation(ValidationKind::BarrierCell, "That square is blocked.")
}

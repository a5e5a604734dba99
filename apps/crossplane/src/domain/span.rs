//! Word-boundary discovery.
//!
//! Given the pending letters and a direction, find the maximal run of
//! occupied cells that contains them. The run grows outwards from the first
//! and last pending letter through confirmed and pending cells alike and
//! stops at the first open empty cell, a barrier, or the edge of the plane.

use crate::domain::barrier::is_barrier_at;
use crate::domain::cell::Letter;
use crate::domain::coords::{Coord, Direction};
use crate::domain::grid::GridStore;
use crate::domain::pending::PendingWord;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterSource {
    Confirmed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanLetter {
    pub coord: Coord,
    pub letter: Letter,
    pub source: LetterSource,
}

/// Inclusive run of letters forming the candidate word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    pub direction: Direction,
    pub letters: Vec<SpanLetter>,
}

impl WordSpan {
    pub fn start(&self) -> Coord {
        self.letters[0].coord
    }

    pub fn end(&self) -> Coord {
        self.letters[self.letters.len() - 1].coord
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn word(&self) -> String {
        self.letters.iter().map(|l| l.letter.as_char()).collect()
    }

    pub fn touches_confirmed(&self) -> bool {
        self.letters
            .iter()
            .any(|l| l.source == LetterSource::Confirmed)
    }

    /// Letters this span would add to the grid.
    pub fn new_letters(&self) -> impl Iterator<Item = &SpanLetter> {
        self.letters
            .iter()
            .filter(|l| l.source == LetterSource::Pending)
    }
}

/// Discover the span for `pending` along `direction`.
///
/// Fails with `NothingPending` on an empty buffer, `NotInLine` when the
/// pending letters do not share a row (across) or column (down), and
/// `WordHasGaps` when an empty or barrier cell sits inside the span.
pub fn discover_span(
    grid: &GridStore,
    pending: &PendingWord,
    direction: Direction,
) -> Result<WordSpan, DomainError> {
    let mut coords: Vec<Coord> = pending.iter().map(|p| p.coord).collect();
    let Some(&first) = coords.first() else {
        return Err(DomainError::validation(
            ValidationKind::NothingPending,
            "Type some letters first.",
        ));
    };

    let line = first.across(direction);
    if coords.iter().any(|c| c.across(direction) != line) {
        return Err(DomainError::validation(
            ValidationKind::NotInLine,
            "Letters must be in a single line.",
        ));
    }

    coords.sort_by_key(|c| c.along(direction));
    let occupied = |c: Coord| grid.contains(c) || pending.contains(c);

    let start = extend(coords[0], direction, -1, &occupied);
    let end = extend(coords[coords.len() - 1], direction, 1, &occupied);

    let from = i64::from(start.along(direction));
    let to = i64::from(end.along(direction));
    // A gap-free span holds at most every confirmed and pending letter.
    let limit = grid.confirmed_count() + pending.len();
    if usize::try_from(to - from + 1).map_or(true, |len| len > limit) {
        return Err(gaps());
    }

    let mut letters = Vec::new();
    for along in from..=to {
        // `along` lies between two valid i32 positions, so the cast is lossless.
        let coord = match direction {
            Direction::Across => Coord::new(along as i32, line),
            Direction::Down => Coord::new(line, along as i32),
        };
        let entry = if is_barrier_at(coord) {
            return Err(gaps());
        } else if let Some(letter) = grid.letter_at(coord) {
            SpanLetter {
                coord,
                letter,
                source: LetterSource::Confirmed,
            }
        } else if let Some(letter) = pending.get(coord) {
            SpanLetter {
                coord,
                letter,
                source: LetterSource::Pending,
            }
        } else {
            return Err(gaps());
        };
        letters.push(entry);
    }

    Ok(WordSpan { direction, letters })
}

fn gaps() -> DomainError {
    DomainError::validation(ValidationKind::WordHasGaps, "Word has gaps!")
}

fn extend<F>(from: Coord, direction: Direction, step: i32, occupied: &F) -> Coord
where
    F: Fn(Coord) -> bool,
{
    let mut current = from;
    while let Some(next) = current.step(direction, step) {
        if is_barrier_at(next) || !occupied(next) {
            break;
        }
        current = next;
    }
    current
}

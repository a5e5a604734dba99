//! Word placement: turn a pending buffer into confirmed cells.
//!
//! Guards run in a fixed order and the first failure wins. Nothing touches
//! the grid or the cooldown until the validator has accepted the word and a
//! second discovery pass on the current grid still yields the same span.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::domain::span::WordSpan;
use crate::domain::{
    discover_span, Cell, Coord, CooldownGate, Direction, GridStore, PendingWord, SessionCounters,
};
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::services::validation::{Verdict, WordValidator};

/// A committed word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedWord {
    pub word: String,
    pub direction: Direction,
    pub start: Coord,
    /// Cells this placement confirmed, in span order.
    pub added: Vec<Coord>,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Accepted(PlacedWord),
    Rejected(DomainError),
    Blocked { remaining: Duration },
}

impl PlacementOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlacementOutcome::Accepted(_))
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            PlacementOutcome::Accepted(_) => None,
            PlacementOutcome::Rejected(err) => Some(err.code()),
            PlacementOutcome::Blocked { .. } => Some(ErrorCode::CooldownActive),
        }
    }
}

pub struct WordPlacementEngine {
    grid: Arc<GridStore>,
    validator: Arc<dyn WordValidator>,
    cooldown: Mutex<CooldownGate>,
    in_flight: AtomicBool,
}

impl WordPlacementEngine {
    pub fn new(
        grid: Arc<GridStore>,
        validator: Arc<dyn WordValidator>,
        cooldown: CooldownGate,
    ) -> Self {
        Self {
            grid,
            validator,
            cooldown: Mutex::new(cooldown),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn grid(&self) -> &Arc<GridStore> {
        &self.grid
    }

    pub fn counters(&self) -> SessionCounters {
        self.cooldown.lock().counters()
    }

    /// Remaining cooldown at `now`, if blocked.
    pub fn cooldown_remaining(&self, now: OffsetDateTime) -> Option<Duration> {
        self.cooldown.lock().remaining(now)
    }

    pub fn is_validating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Try to place the word formed by `pending` along `direction`.
    ///
    /// Only one submission runs at a time; a concurrent call is rejected
    /// without consulting the validator.
    pub async fn submit(
        &self,
        pending: &PendingWord,
        direction: Direction,
        now: OffsetDateTime,
    ) -> PlacementOutcome {
        let Some(_flight) = FlightGuard::acquire(&self.in_flight) else {
            debug!("Submission rejected, validation already in flight");
            return PlacementOutcome::Rejected(DomainError::conflict(
                ConflictKind::ValidationInFlight,
                "Already checking a word.",
            ));
        };

        if pending.is_empty() {
            return reject(DomainError::validation(
                ValidationKind::NothingPending,
                "Type some letters first.",
            ));
        }

        if let Err(remaining) = self.cooldown.lock().check(now) {
            debug!(remaining_ms = remaining.whole_milliseconds() as i64, "Placement on cooldown");
            return PlacementOutcome::Blocked { remaining };
        }

        let span = match self.check_span(pending, direction) {
            Ok(span) => span,
            Err(err) => return reject(err),
        };
        let word = span.word();

        let definition = match self.validator.validate(&word).await {
            Verdict::Accepted { definition } => definition,
            Verdict::NotFound => {
                return reject(DomainError::not_found(
                    NotFoundKind::Word,
                    format!("\"{word}\" not found in dictionary"),
                ))
            }
            Verdict::Unavailable => {
                warn!(word = %word, "Word validation unavailable");
                return PlacementOutcome::Rejected(DomainError::infra(
                    InfraErrorKind::ServiceUnavailable,
                    "Validation service unavailable",
                ));
            }
        };

        // The grid may have been replaced by a remote snapshot while the
        // validator was running.
        let current = match discover_span(&self.grid, pending, direction) {
            Ok(current) if same_placement(&span, &current) => current,
            _ => {
                debug!(word = %word, "Grid changed during validation");
                return PlacementOutcome::Rejected(DomainError::conflict(
                    ConflictKind::GridChanged,
                    "The grid changed while checking. Try again.",
                ));
            }
        };

        let cells: Vec<Cell> = current
            .new_letters()
            .map(|l| Cell::confirmed(l.coord, l.letter).with_definition(definition.clone()))
            .collect();
        let added: Vec<Coord> = cells.iter().map(|c| c.coord).collect();
        // A remote pull may fill a target after the re-check above.
        if let Err(err) = self.grid.place_word(cells) {
            debug!(word = %word, "Grid changed before commit");
            return PlacementOutcome::Rejected(err);
        }
        self.cooldown.lock().record(now);

        info!(
            word = %word,
            direction = %direction,
            added = added.len(),
            "Word placed"
        );
        PlacementOutcome::Accepted(PlacedWord {
            word,
            direction,
            start: current.start(),
            added,
            definition,
        })
    }

    /// Boundary, new-letter, connectivity and length guards.
    fn check_span(
        &self,
        pending: &PendingWord,
        direction: Direction,
    ) -> Result<WordSpan, DomainError> {
        let span = discover_span(&self.grid, pending, direction)?;

        if span.new_letters().next().is_none() {
            return Err(DomainError::validation(
                ValidationKind::NoNewLetters,
                "No new letters added.",
            ));
        }
        if !span.touches_confirmed() && !self.grid.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::MustConnect,
                "Must connect to existing words!",
            ));
        }
        if span.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::WordTooShort,
                "Word too short.",
            ));
        }
        Ok(span)
    }
}

fn reject(err: DomainError) -> PlacementOutcome {
    debug!(code = %err.code(), reason = %err.message(), "Placement rejected");
    PlacementOutcome::Rejected(err)
}

/// Same word at the same place, still adding at least one letter.
fn same_placement(before: &WordSpan, after: &WordSpan) -> bool {
    before.start() == after.start()
        && before.word() == after.word()
        && after.new_letters().next().is_some()
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

//! Player-facing session operations over [`AppState`].

use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::domain::cooldown::display_secs;
use crate::domain::{
    is_barrier_at, Arrow, Coord, Direction, PendingLetter, PendingWrite, SessionCounters,
};
use crate::errors::domain::DomainError;
use crate::repos::preferences::save_counters;
use crate::services::placement::PlacementOutcome;
use crate::state::app_state::AppState;

pub fn select_cell(state: &AppState, at: Coord) -> Result<(), DomainError> {
    state.input.lock().select_cell(at)
}

/// Type `text` one letter at a time from the cursor. Stops at the first
/// rejected letter; letters before it stay typed. Returns how many letters
/// were accepted.
pub fn type_letters(state: &AppState, text: &str) -> Result<usize, DomainError> {
    let mut input = state.input.lock();
    let mut typed = 0;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        match input.type_letter(&state.grid, c)? {
            PendingWrite::Inserted | PendingWrite::Replaced | PendingWrite::MatchesConfirmed => {
                typed += 1
            }
        }
    }
    Ok(typed)
}

pub fn backspace(state: &AppState) -> bool {
    state.input.lock().backspace()
}

pub fn move_selection(state: &AppState, arrow: Arrow) -> bool {
    state.input.lock().move_selection(arrow)
}

pub fn toggle_direction(state: &AppState) -> Direction {
    let mut input = state.input.lock();
    input.toggle_direction();
    input.direction()
}

pub fn cancel(state: &AppState) {
    state.input.lock().cancel();
}

/// Submit the pending buffer along the current direction.
///
/// On acceptance the buffer is cleared if the player did not touch it while
/// the word was being checked; otherwise only the letters that are now
/// confirmed are dropped. Session counters are then persisted.
pub async fn submit_word(state: &AppState, now: OffsetDateTime) -> PlacementOutcome {
    let (pending, direction) = {
        let input = state.input.lock();
        (input.pending().clone(), input.direction())
    };

    let outcome = state.engine.submit(&pending, direction, now).await;

    if outcome.is_accepted() {
        {
            let mut input = state.input.lock();
            if *input.pending() == pending {
                input.cancel();
            } else {
                input.pending_mut().retain_unconfirmed(&state.grid);
            }
        }

        let counters = state.engine.counters();
        if let Err(err) =
            save_counters(state.preferences.as_ref(), counters, state.config.prefs_ttl).await
        {
            warn!(error = %err, "Unable to persist session counters");
        }
    }

    outcome
}

/// Snapshot of the session for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub selected: Option<Coord>,
    pub direction: Direction,
    pub pending: Vec<PendingLetter>,
    pub validating: bool,
    pub counters: SessionCounters,
    pub cooldown_remaining: Option<Duration>,
    pub confirmed_cells: usize,
}

pub fn view(state: &AppState, now: OffsetDateTime) -> SessionView {
    let input = state.input.lock();
    SessionView {
        selected: input.selected(),
        direction: input.direction(),
        pending: input.pending().iter().copied().collect(),
        validating: state.engine.is_validating(),
        counters: state.engine.counters(),
        cooldown_remaining: state.engine.cooldown_remaining(now),
        confirmed_cells: state.grid.confirmed_count(),
    }
}

/// Text picture of the square of cells within `radius` of `center`.
///
/// `#` barrier, `A` confirmed, `a` pending, `_` the empty selected cell,
/// `.` empty.
pub fn render_region(state: &AppState, center: Coord, radius: i32) -> String {
    let input = state.input.lock();
    let radius = radius.max(0);
    let mut out = String::new();

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let Some(at) = center.offset(dx, dy) else {
                out.push(' ');
                continue;
            };
            let glyph = if is_barrier_at(at) {
                '#'
            } else if let Some(letter) = state.grid.letter_at(at) {
                letter.as_char()
            } else if let Some(letter) = input.pending().get(at) {
                letter.as_char().to_ascii_lowercase()
            } else if input.selected() == Some(at) {
                '_'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Line shown to the player after a submission.
pub fn outcome_message(outcome: &PlacementOutcome) -> String {
    match outcome {
        PlacementOutcome::Accepted(placed) => match &placed.definition {
            Some(definition) => format!("Placed: {} ({definition})", placed.word),
            None => format!("Placed: {}", placed.word),
        },
        PlacementOutcome::Rejected(err) => err.message().to_string(),
        PlacementOutcome::Blocked { remaining } => {
            format!("Wait {}s before placing another word.", display_secs(*remaining))
        }
    }
}

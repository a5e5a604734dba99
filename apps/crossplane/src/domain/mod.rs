//! Domain layer: the plane, its barriers, the confirmed grid and the rules for
//! turning typed letters into words. No I/O.

pub mod barrier;
pub mod cell;
pub mod cooldown;
pub mod coords;
pub mod grid;
pub mod input;
pub mod pending;
pub mod seed;
pub mod span;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_span;

// Re-exports for ergonomics
pub use barrier::{is_barrier, is_barrier_at, is_occupiable};
pub use cell::{Cell, Letter};
pub use cooldown::{CooldownGate, SessionCounters};
pub use coords::{Coord, Direction};
pub use grid::{ChangeOrigin, GridEvent, GridStore};
pub use input::{Arrow, InputState};
pub use pending::{PendingLetter, PendingWord, PendingWrite};
pub use seed::seed_cells;
pub use span::{discover_span, WordSpan};

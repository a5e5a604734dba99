use crate::domain::cell::{Cell, Letter};
use crate::domain::coords::Coord;

/// Word laid down on an empty grid. `.` leaves its cell empty.
pub const SEED_WORD: &str = "CROSS.PLANE";

/// Leftmost x of the seed word; the word is centred on the origin row.
pub const SEED_START_X: i32 = -5;

pub const SEED_DEFINITION: &str = "Start here";

/// Cells of the seed word.
pub fn seed_cells() -> Vec<Cell> {
    SEED_WORD
        .chars()
        .zip(SEED_START_X..)
        .filter_map(|(c, x)| {
            let letter = Letter::parse(c).ok()?;
            Some(
                Cell::confirmed(Coord::new(x, 0), letter)
                    .with_definition(Some(SEED_DEFINITION.to_string())),
            )
        })
        .collect()
}

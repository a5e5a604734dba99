// Proptest generators for grid types.

use proptest::prelude::*;

use crate::domain::{is_barrier_at, Cell, Coord, Direction, Letter};

pub fn letter() -> impl Strategy<Value = Letter> {
    (b'A'..=b'Z').prop_map(|b| Letter::parse(char::from(b)).expect("A-Z is a valid letter"))
}

pub fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Across), Just(Direction::Down)]
}

/// Any coordinate on the plane, edges included.
pub fn coord() -> impl Strategy<Value = Coord> {
    prop_oneof![
        (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Coord::new(x, y)),
        (-40i32..40, -40i32..40).prop_map(|(x, y)| Coord::new(x, y)),
    ]
}

/// Coordinate near the origin, where the safe zone and seed live.
pub fn near_coord() -> impl Strategy<Value = Coord> {
    (-20i32..20, -20i32..20).prop_map(|(x, y)| Coord::new(x, y))
}

/// Confirmed cells on open squares near the origin, unique by coordinate.
pub fn cells(max: usize) -> impl Strategy<Value = Vec<Cell>> {
    prop::collection::btree_map(near_coord(), letter(), 0..max).prop_map(|m| {
        m.into_iter()
            .filter(|(coord, _)| !is_barrier_at(*coord))
            .map(|(coord, letter)| Cell::confirmed(coord, letter))
            .collect()
    })
}

//! Word-boundary discovery over the seeded grid and arbitrary boards.

use proptest::prelude::*;

use crate::domain::span::{discover_span, LetterSource};
use crate::domain::{
    is_barrier, is_barrier_at, seed_cells, test_gens, test_prelude, ChangeOrigin, Coord,
    Direction, GridStore, Letter, PendingLetter, PendingWord,
};
use crate::errors::domain::{DomainError, ValidationKind};

fn seeded() -> GridStore {
    let grid = GridStore::new();
    grid.replace_all(seed_cells(), ChangeOrigin::Bootstrap);
    grid
}

fn pending(entries: &[(i32, i32, char)]) -> PendingWord {
    entries
        .iter()
        .map(|&(x, y, c)| PendingLetter {
            coord: Coord::new(x, y),
            letter: Letter::parse(c).unwrap(),
        })
        .collect()
}

fn kind(err: DomainError) -> ValidationKind {
    match err {
        DomainError::Validation(kind, _) => kind,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn suffix_after_seed_extends_back_to_planes() {
    let grid = seeded();
    let span = discover_span(&grid, &pending(&[(6, 0, 'S')]), Direction::Across).unwrap();

    assert_eq!(span.word(), "PLANES");
    assert_eq!(span.start(), Coord::new(1, 0));
    assert_eq!(span.end(), Coord::new(6, 0));
    assert!(span.touches_confirmed());
    let added: Vec<Coord> = span.new_letters().map(|l| l.coord).collect();
    assert_eq!(added, vec![Coord::new(6, 0)]);
}

#[test]
fn barrier_inside_span_is_a_gap() {
    assert!(is_barrier(8, 0));
    let grid = seeded();
    let err = discover_span(
        &grid,
        &pending(&[(7, 0, 'A'), (9, 0, 'B')]),
        Direction::Across,
    )
    .unwrap_err();

    assert_eq!(err.message(), "Word has gaps!");
    assert_eq!(kind(err), ValidationKind::WordHasGaps);
}

#[test]
fn pending_letter_on_a_barrier_is_a_gap() {
    assert!(is_barrier(8, 0));
    let grid = seeded();
    let err = discover_span(
        &grid,
        &pending(&[(6, 0, 'S'), (7, 0, 'E'), (8, 0, 'D')]),
        Direction::Across,
    )
    .unwrap_err();
    assert_eq!(kind(err), ValidationKind::WordHasGaps);
}

#[test]
fn letters_at_opposite_ends_of_a_row_are_a_gap() {
    let grid = GridStore::new();
    let err = discover_span(
        &grid,
        &pending(&[(i32::MIN + 1, 2, 'A'), (i32::MAX - 1, 2, 'B')]),
        Direction::Across,
    )
    .unwrap_err();
    assert_eq!(err.message(), "Word has gaps!");

    let err = discover_span(
        &grid,
        &pending(&[(4, i32::MAX, 'B'), (4, i32::MIN, 'A')]),
        Direction::Down,
    )
    .unwrap_err();
    assert_eq!(kind(err), ValidationKind::WordHasGaps);
}

#[test]
fn empty_cell_inside_span_is_a_gap() {
    let grid = GridStore::new();
    let err = discover_span(
        &grid,
        &pending(&[(3, 2, 'B'), (1, 2, 'A')]),
        Direction::Across,
    )
    .unwrap_err();
    assert_eq!(kind(err), ValidationKind::WordHasGaps);
}

#[test]
fn down_word_hangs_off_seed_letter() {
    let grid = seeded();
    let span = discover_span(
        &grid,
        &pending(&[(-5, 2, 'T'), (-5, 1, 'A')]),
        Direction::Down,
    )
    .unwrap();

    assert_eq!(span.word(), "CAT");
    assert_eq!(span.start(), Coord::new(-5, 0));
    assert_eq!(span.letters[0].source, LetterSource::Confirmed);
}

#[test]
fn letters_off_the_line_are_rejected() {
    let grid = GridStore::new();
    let err = discover_span(
        &grid,
        &pending(&[(1, 2, 'A'), (2, 3, 'B')]),
        Direction::Across,
    )
    .unwrap_err();
    assert_eq!(kind(err), ValidationKind::NotInLine);
}

#[test]
fn empty_buffer_is_nothing_pending() {
    let grid = seeded();
    let err = discover_span(&grid, &PendingWord::new(), Direction::Down).unwrap_err();
    assert_eq!(kind(err), ValidationKind::NothingPending);
}

#[test]
fn confirmed_letter_wins_over_pending_duplicate() {
    let grid = seeded();
    // Only reachable when a remote pull confirms a cell after it was typed.
    let span = discover_span(
        &grid,
        &pending(&[(5, 0, 'X'), (6, 0, 'S')]),
        Direction::Across,
    )
    .unwrap();
    assert_eq!(span.word(), "PLANES");
    assert_eq!(span.new_letters().count(), 1);
}

#[test]
fn plane_edge_acts_as_boundary() {
    let grid = GridStore::new();
    let span = discover_span(
        &grid,
        &pending(&[(i32::MAX, 0, 'N'), (i32::MAX - 1, 0, 'O')]),
        Direction::Across,
    )
    .unwrap();
    assert_eq!(span.word(), "ON");
    assert_eq!(span.end(), Coord::new(i32::MAX, 0));
}

#[test]
fn discovery_does_not_touch_the_grid() {
    let grid = seeded();
    let before = grid.version();
    let _ = discover_span(&grid, &pending(&[(7, 0, 'A'), (9, 0, 'B')]), Direction::Across);
    let _ = discover_span(&grid, &pending(&[(6, 0, 'S')]), Direction::Across);
    assert_eq!(grid.version(), before);
    assert_eq!(grid.confirmed_count(), 10);
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Barrier placement depends on nothing but the coordinates.
    #[test]
    fn prop_barriers_are_deterministic(c in test_gens::coord()) {
        prop_assert_eq!(is_barrier(c.x, c.y), is_barrier_at(c));
        if c.x.unsigned_abs() < 6 && c.y.unsigned_abs() < 6 {
            prop_assert!(!is_barrier_at(c));
        }
    }

    /// A discovered span is contiguous, covers every pending letter, and is
    /// bounded on both sides by an empty cell, a barrier or the plane edge.
    #[test]
    fn prop_discovered_span_is_maximal_and_gap_free(
        board in test_gens::cells(60),
        row in -20i32..20,
        xs in prop::collection::btree_set(-20i32..20, 1..5),
        letter in test_gens::letter(),
        direction in test_gens::direction(),
    ) {
        let grid = GridStore::new();
        grid.replace_all(board, ChangeOrigin::Remote);
        let buffer: PendingWord = xs
            .iter()
            .map(|&i| {
                let coord = match direction {
                    Direction::Across => Coord::new(i, row),
                    Direction::Down => Coord::new(row, i),
                };
                PendingLetter { coord, letter }
            })
            .filter(|p| !is_barrier_at(p.coord))
            .collect();
        prop_assume!(!buffer.is_empty());

        let Ok(span) = discover_span(&grid, &buffer, direction) else {
            return Ok(());
        };

        for pair in span.letters.windows(2) {
            prop_assert_eq!(pair[0].coord.step(direction, 1), Some(pair[1].coord));
        }
        for p in buffer.iter() {
            prop_assert!(span.letters.iter().any(|l| l.coord == p.coord));
        }
        for l in &span.letters {
            prop_assert!(!is_barrier_at(l.coord));
            match l.source {
                LetterSource::Confirmed => prop_assert_eq!(grid.letter_at(l.coord), Some(l.letter)),
                LetterSource::Pending => prop_assert!(!grid.contains(l.coord)),
            }
        }
        let occupied = |c: Coord| grid.contains(c) || buffer.contains(c);
        for outer in [span.start().step(direction, -1), span.end().step(direction, 1)]
            .into_iter()
            .flatten()
        {
            prop_assert!(is_barrier_at(outer) || !occupied(outer));
        }
    }
}

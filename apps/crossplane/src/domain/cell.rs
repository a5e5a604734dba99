use std::fmt;

use crate::domain::coords::Coord;
use crate::errors::domain::{DomainError, ValidationKind};

/// A single uppercase ASCII letter A-Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(char);

impl Letter {
    /// Accepts a-z / A-Z and normalizes to uppercase.
    pub fn parse(c: char) -> Result<Self, DomainError> {
        if c.is_ascii_alphabetic() {
            Ok(Letter(c.to_ascii_uppercase()))
        } else {
            Err(DomainError::validation(
                ValidationKind::InvalidLetter,
                format!("'{c}' is not a letter"),
            ))
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for Letter {
    type Error = DomainError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::parse(c)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A committed letter on the grid.
///
/// Only confirmed cells are ever stored; `confirmed == false` is the same as
/// the cell not existing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub coord: Coord,
    pub letter: Letter,
    pub confirmed: bool,
    /// Definition of the word that committed this cell, when one was known.
    pub definition: Option<String>,
}

impl Cell {
    pub fn confirmed(coord: Coord, letter: Letter) -> Self {
        Self {
            coord,
            letter,
            confirmed: true,
            definition: None,
        }
    }

    pub fn with_definition(mut self, definition: Option<String>) -> Self {
        self.definition = definition;
        self
    }

    /// Value identity used by reconciliation: coordinate, letter, confirmed.
    /// The definition is deliberately not part of it.
    pub fn same_value(&self, other: &Cell) -> bool {
        self.coord == other.coord
            && self.letter == other.letter
            && self.confirmed == other.confirmed
    }
}

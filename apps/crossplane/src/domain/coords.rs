use std::fmt;

/// Integer cell coordinate on the unbounded plane. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbour `step` cells along `direction`, or `None` past the edge of
    /// the i32 plane.
    pub fn step(self, direction: Direction, step: i32) -> Option<Coord> {
        match direction {
            Direction::Across => self.x.checked_add(step).map(|x| Coord { x, y: self.y }),
            Direction::Down => self.y.checked_add(step).map(|y| Coord { x: self.x, y }),
        }
    }

    /// Neighbour by an arbitrary offset, or `None` on overflow.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Coord> {
        Some(Coord {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Position along `direction`'s axis.
    pub fn along(self, direction: Direction) -> i32 {
        match direction {
            Direction::Across => self.x,
            Direction::Down => self.y,
        }
    }

    /// Position on the axis perpendicular to `direction`.
    pub fn across(self, direction: Direction) -> i32 {
        match direction {
            Direction::Across => self.y,
            Direction::Down => self.x,
        }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Typing direction. Across varies x, down varies y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Across,
    Down,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

//! Error codes for the crossplane engine.
//!
//! Every failure the engine reports carries one of these codes. Add new codes
//! here; never pass ad-hoc strings as error codes.

use core::fmt;

/// Centralized error codes.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string, suitable for
/// logs and for front-ends that localise messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Placement guards
    /// Submit called with an empty pending buffer
    NothingPending,
    /// Span contains an empty or barrier cell
    WordHasGaps,
    /// Pending letters are not on one line along the direction
    NotInLine,
    /// Span consists only of confirmed letters
    NoNewLetters,
    /// Span touches no confirmed letter on a non-empty grid
    MustConnect,
    /// Span shorter than two letters
    WordTooShort,
    /// Typing over a confirmed letter with a different one
    LetterLocked,
    /// Target cell is a barrier
    BarrierCell,
    /// Input is not a letter A-Z
    InvalidLetter,
    /// No cell selected for input
    NoSelection,
    /// Placement attempted during cooldown
    CooldownActive,
    /// General validation error
    ValidationError,

    // Word validation
    /// Word rejected by the dictionary (or content policy)
    WordNotFound,

    // Conflicts
    /// Another submission is still validating
    ValidationInFlight,
    /// Grid changed underneath an in-flight submission
    GridChanged,

    // System errors
    /// Validation service unreachable or failing
    ServiceUnavailable,
    /// Remote snapshot store failure
    SnapshotStoreError,
    /// Session preference store failure
    PreferenceStoreError,
    /// Stored or received data could not be decoded
    DataCorruption,
    ConfigError,
    Timeout,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Placement guards
            Self::NothingPending => "NOTHING_PENDING",
            Self::WordHasGaps => "WORD_HAS_GAPS",
            Self::NotInLine => "NOT_IN_LINE",
            Self::NoNewLetters => "NO_NEW_LETTERS",
            Self::MustConnect => "MUST_CONNECT",
            Self::WordTooShort => "WORD_TOO_SHORT",
            Self::LetterLocked => "LETTER_LOCKED",
            Self::BarrierCell => "BARRIER_CELL",
            Self::InvalidLetter => "INVALID_LETTER",
            Self::NoSelection => "NO_SELECTION",
            Self::CooldownActive => "COOLDOWN_ACTIVE",
            Self::ValidationError => "VALIDATION_ERROR",

            // Word validation
            Self::WordNotFound => "WORD_NOT_FOUND",

            // Conflicts
            Self::ValidationInFlight => "VALIDATION_IN_FLIGHT",
            Self::GridChanged => "GRID_CHANGED",

            // System errors
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::SnapshotStoreError => "SNAPSHOT_STORE_ERROR",
            Self::PreferenceStoreError => "PREFERENCE_STORE_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

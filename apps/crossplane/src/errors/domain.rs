//! Domain-level error type used across the engine, services and adapters.
//!
//! This error type is transport- and storage-agnostic. The `String` payload
//! of every variant is the short, user-visible message; the kind enums carry
//! the machine-readable classification.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::ErrorCode;

/// User-correctable rule violations, raised synchronously before any state
/// is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    NothingPending,
    WordHasGaps,
    NotInLine,
    NoNewLetters,
    MustConnect,
    WordTooShort,
    LetterLocked,
    BarrierCell,
    InvalidLetter,
    NoSelection,
    Other(String),
}

/// Things the engine looked up and did not find.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Word,
    Other(String),
}

/// Races between concurrent activity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    ValidationInFlight,
    GridChanged,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    ServiceUnavailable,
    Timeout,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Placement guard or input rule violation
    Validation(ValidationKind, String),
    /// Word rejected by the external validity check
    NotFound(NotFoundKind, String),
    /// Concurrent activity got in the way
    Conflict(ConflictKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// The short message shown to the player.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::Infra(_, d) => d,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::NothingPending => ErrorCode::NothingPending,
                ValidationKind::WordHasGaps => ErrorCode::WordHasGaps,
                ValidationKind::NotInLine => ErrorCode::NotInLine,
                ValidationKind::NoNewLetters => ErrorCode::NoNewLetters,
                ValidationKind::MustConnect => ErrorCode::MustConnect,
                ValidationKind::WordTooShort => ErrorCode::WordTooShort,
                ValidationKind::LetterLocked => ErrorCode::LetterLocked,
                ValidationKind::BarrierCell => ErrorCode::BarrierCell,
                ValidationKind::InvalidLetter => ErrorCode::InvalidLetter,
                ValidationKind::NoSelection => ErrorCode::NoSelection,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::NotFound(_, _) => ErrorCode::WordNotFound,
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::ValidationInFlight => ErrorCode::ValidationInFlight,
                ConflictKind::GridChanged | ConflictKind::Other(_) => ErrorCode::GridChanged,
            },
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::ServiceUnavailable => ErrorCode::ServiceUnavailable,
                InfraErrorKind::Timeout => ErrorCode::Timeout,
                InfraErrorKind::DataCorruption => ErrorCode::DataCorruption,
                InfraErrorKind::Other(_) => ErrorCode::InternalError,
            },
        }
    }
}

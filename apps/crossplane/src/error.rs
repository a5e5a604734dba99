use std::error::Error as StdError;

use thiserror::Error;

use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::errors::ErrorCode;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Infrastructure-level error for everything outside the pure engine rules:
/// configuration, remote storage, preference storage and transports.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(DomainError),
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Snapshot store error: {detail}")]
    Store {
        code: ErrorCode,
        detail: String,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Preference store error: {detail}")]
    Preferences {
        detail: String,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Service unavailable: {detail}")]
    Unavailable {
        detail: String,
        #[source]
        source: Option<BoxedSource>,
    },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
}

impl AppError {
    /// Helper method to extract error code from any error variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Domain(err) => err.code(),
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Store { code, .. } => *code,
            AppError::Preferences { .. } => ErrorCode::PreferenceStoreError,
            AppError::Unavailable { .. } => ErrorCode::ServiceUnavailable,
            AppError::Internal { code, .. } => *code,
        }
    }

    /// Helper method to extract error detail from any error variant
    pub fn detail(&self) -> String {
        match self {
            AppError::Domain(err) => err.message().to_string(),
            AppError::Config { detail }
            | AppError::Store { detail, .. }
            | AppError::Preferences { detail, .. }
            | AppError::Unavailable { detail, .. }
            | AppError::Internal { detail, .. } => detail.clone(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn store(detail: impl Into<String>) -> Self {
        Self::Store {
            code: ErrorCode::SnapshotStoreError,
            detail: detail.into(),
            source: None,
        }
    }

    pub fn store_with_source(
        detail: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            code: ErrorCode::SnapshotStoreError,
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn preferences(
        detail: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Preferences {
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn unavailable(
        detail: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            detail: detail.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            detail: detail.into(),
        }
    }

    pub fn data_corruption(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::DataCorruption,
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::Domain(err)
    }
}

impl From<AppError> for DomainError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(inner) => inner,
            AppError::Unavailable { detail, .. } => {
                DomainError::infra(InfraErrorKind::ServiceUnavailable, detail)
            }
            other => DomainError::infra(
                InfraErrorKind::Other(other.code().to_string()),
                other.detail(),
            ),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::data_corruption(format!("json error: {e}"))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::store_with_source(format!("redis error: {e}"), e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal {
            code: ErrorCode::InternalError,
            detail: format!("io error: {e}"),
        }
    }
}

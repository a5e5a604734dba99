#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod services;
pub mod state;

// Re-exports for public API
pub use config::engine::{EngineConfig, StoreKind};
pub use error::AppError;
pub use errors::domain::DomainError;
pub use errors::ErrorCode;
pub use infra::state::build_state;
pub use services::placement::{PlacedWord, PlacementOutcome, WordPlacementEngine};
pub use services::sync::{BootstrapOutcome, SyncReconciler};
pub use services::validation::{Verdict, WordValidator};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    crossplane_test_support::test_logging::init();
}

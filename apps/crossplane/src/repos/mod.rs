//! Storage seams used by services: the shared grid document and the
//! per-session preference store.

pub mod preferences;
pub mod snapshots;

pub use preferences::PreferenceStore;
pub use snapshots::{SnapshotFeed, SnapshotStore};

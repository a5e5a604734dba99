//! Session builders for integration tests.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use crossplane::adapters::MemoryPreferenceStore;
use crossplane::repos::{PreferenceStore, SnapshotStore};
use crossplane::{build_state, AppState, EngineConfig};
use time::Duration;

pub const TEST_DEBOUNCE: StdDuration = StdDuration::from_millis(1000);

pub fn test_config() -> EngineConfig {
    EngineConfig {
        cooldown: Duration::seconds(15),
        sync_debounce: TEST_DEBOUNCE,
        ..EngineConfig::default()
    }
}

/// A session with live sync over `store`, in-memory preferences and the
/// given validator.
pub async fn session<V>(store: Arc<dyn SnapshotStore>, validator: Arc<V>) -> AppState
where
    V: crossplane::WordValidator + 'static,
{
    session_with_prefs(store, validator, Arc::new(MemoryPreferenceStore::new())).await
}

pub async fn session_with_prefs<V>(
    store: Arc<dyn SnapshotStore>,
    validator: Arc<V>,
    preferences: Arc<dyn PreferenceStore>,
) -> AppState
where
    V: crossplane::WordValidator + 'static,
{
    build_state()
        .with_config(test_config())
        .with_store(store)
        .with_validator(validator)
        .with_preferences(preferences)
        .build()
        .await
        .expect("test session should build")
}

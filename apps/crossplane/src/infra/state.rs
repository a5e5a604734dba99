use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::{
    DictionaryApiValidator, FilePreferenceStore, MemoryPreferenceStore, MemorySnapshotStore,
    RedisSnapshotStore,
};
use crate::config::engine::{EngineConfig, StoreKind};
use crate::domain::{CooldownGate, GridStore, SessionCounters};
use crate::error::AppError;
use crate::repos::preferences::load_counters;
use crate::repos::{PreferenceStore, SnapshotStore};
use crate::services::placement::WordPlacementEngine;
use crate::services::sync::SyncReconciler;
use crate::services::validation::WordValidator;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: EngineConfig,
    store: Option<Arc<dyn SnapshotStore>>,
    validator: Option<Arc<dyn WordValidator>>,
    preferences: Option<Arc<dyn PreferenceStore>>,
    start_sync: bool,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            store: None,
            validator: None,
            preferences: None,
            start_sync: true,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this store instead of the one named by the config.
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn WordValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Bootstrap only; no push or pull loops.
    pub fn without_sync(mut self) -> Self {
        self.start_sync = false;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let config = self.config;

        let store: Arc<dyn SnapshotStore> = match self.store {
            Some(store) => store,
            None => match &config.store {
                StoreKind::Memory => Arc::new(MemorySnapshotStore::new()),
                StoreKind::Redis { url } => Arc::new(RedisSnapshotStore::new(url, &config.grid_id)?),
            },
        };

        let validator: Arc<dyn WordValidator> = match self.validator {
            Some(validator) => validator,
            None => Arc::new(DictionaryApiValidator::new(
                config.dictionary_url.clone(),
                config.profanity_url.clone(),
                config.validation_timeout,
            )?),
        };

        let preferences: Arc<dyn PreferenceStore> = match self.preferences {
            Some(preferences) => preferences,
            None => match &config.prefs_path {
                Some(path) => Arc::new(FilePreferenceStore::new(path.clone())),
                None => Arc::new(MemoryPreferenceStore::new()),
            },
        };

        let counters = match load_counters(preferences.as_ref()).await {
            Ok(counters) => counters,
            Err(err) => {
                warn!(error = %err, "Unable to restore session counters");
                SessionCounters::default()
            }
        };

        let grid = Arc::new(GridStore::new());
        let engine = Arc::new(WordPlacementEngine::new(
            grid.clone(),
            validator,
            CooldownGate::restore(config.cooldown, counters),
        ));
        let sync = Arc::new(SyncReconciler::new(grid, store, config.sync_debounce));

        let bootstrap = sync.bootstrap().await;
        let handle = if self.start_sync {
            Some(sync.start().await)
        } else {
            None
        };

        info!(
            grid_id = %config.grid_id,
            outcome = ?bootstrap,
            words_placed = counters.words_placed,
            "Session ready"
        );
        Ok(AppState::new(
            config,
            engine,
            sync,
            preferences,
            bootstrap,
            handle,
        ))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

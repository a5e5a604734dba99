use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::engine::EngineConfig;
use crate::domain::{GridStore, InputState};
use crate::repos::PreferenceStore;
use crate::services::placement::WordPlacementEngine;
use crate::services::sync::{BootstrapOutcome, SyncHandle, SyncReconciler};

/// Everything one player session needs: the shared grid, the engine, the
/// sync loops and the local input state.
#[derive(Clone)]
pub struct AppState {
    pub config: EngineConfig,
    pub grid: Arc<GridStore>,
    pub engine: Arc<WordPlacementEngine>,
    pub sync: Arc<SyncReconciler>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub input: Arc<Mutex<InputState>>,
    pub bootstrap: BootstrapOutcome,
    sync_handle: Arc<tokio::sync::Mutex<Option<SyncHandle>>>,
}

impl AppState {
    pub fn new(
        config: EngineConfig,
        engine: Arc<WordPlacementEngine>,
        sync: Arc<SyncReconciler>,
        preferences: Arc<dyn PreferenceStore>,
        bootstrap: BootstrapOutcome,
        sync_handle: Option<SyncHandle>,
    ) -> Self {
        Self {
            config,
            grid: engine.grid().clone(),
            engine,
            sync,
            preferences,
            input: Arc::new(Mutex::new(InputState::new())),
            bootstrap,
            sync_handle: Arc::new(tokio::sync::Mutex::new(sync_handle)),
        }
    }

    /// Whether a live remote subscription is running.
    pub async fn is_live(&self) -> bool {
        self.sync_handle
            .lock()
            .await
            .as_ref()
            .is_some_and(SyncHandle::is_live)
    }

    /// Stop the sync loops, flushing a scheduled push. Idempotent.
    pub async fn shutdown(&self) {
        let handle = self.sync_handle.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }
}

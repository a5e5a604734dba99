use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};

use crate::error::AppError;
use crate::repos::preferences::PreferenceStore;

/// Process-lifetime preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, (String, OffsetDateTime)>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        let expires_at = OffsetDateTime::now_utc() + ttl;
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }
}

//! Preference store backed by a small JSON file.
//!
//! `{ "entries": { "<key>": { "value": "...", "expiresAt": <unix millis> } } }`

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::AppError;
use crate::repos::preferences::{to_millis, PreferenceStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    #[serde(rename = "expiresAt")]
    expires_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default)]
    entries: BTreeMap<String, Entry>,
}

#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    io: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<PrefsFile, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(PrefsFile::default()),
            Err(err) => {
                return Err(AppError::preferences(
                    format!("Unable to read {}", self.path.display()),
                    err,
                ))
            }
        };
        match serde_json::from_str(&raw) {
            Ok(file) => Ok(file),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Preference file is corrupt, starting fresh"
                );
                Ok(PrefsFile::default())
            }
        }
    }

    async fn write(&self, file: &PrefsFile) -> Result<(), AppError> {
        let encoded = serde_json::to_vec_pretty(file)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|err| AppError::preferences("Unable to create preference directory", err))?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|err| AppError::preferences("Unable to write preference file", err))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| AppError::preferences("Unable to replace preference file", err))
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let _io = self.io.lock().await;
        let file = self.read().await?;
        let now = to_millis(OffsetDateTime::now_utc());
        Ok(file
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        let _io = self.io.lock().await;
        let mut file = self.read().await?;
        let now = OffsetDateTime::now_utc();
        let now_ms = to_millis(now);

        file.entries.retain(|_, entry| entry.expires_at > now_ms);
        file.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: to_millis(now + ttl),
            },
        );
        self.write(&file).await
    }
}

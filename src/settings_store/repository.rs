//! Settings Store repository
//!
//! JSON-file persistence of the settings record

use super::types::{CameraSettings, SettingsRecord};
use super::{SettingsRx, SettingsStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::{watch, Mutex};

/// Durable settings store backed by a single JSON file
pub struct FileSettingsStore {
    path: PathBuf,
    tx: watch::Sender<Option<CameraSettings>>,
    /// Serializes writers so the temp file is never shared
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    /// Open the store, loading any existing record
    ///
    /// A missing or unreadable record is treated as "not configured".
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = Self::load(&path).await;

        tracing::info!(
            path = %path.display(),
            configured = initial.is_some(),
            "Camera settings loaded"
        );

        let (tx, _) = watch::channel(initial);
        Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value
    pub fn current(&self) -> Option<CameraSettings> {
        self.tx.borrow().clone()
    }

    async fn load(path: &Path) -> Option<CameraSettings> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read camera settings");
                return None;
            }
        };

        match serde_json::from_slice::<SettingsRecord>(&bytes) {
            Ok(record) => record.to_settings(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse camera settings");
                None
            }
        }
    }

    async fn persist(&self, record: &SettingsRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // write-then-rename keeps the previous record intact on failure
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    fn read_live(&self) -> SettingsRx {
        self.tx.subscribe()
    }

    async fn write(&self, settings: CameraSettings) -> Result<()> {
        let record = SettingsRecord::from(&settings);

        let _guard = self.write_lock.lock().await;
        self.persist(&record).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to persist camera settings");
            Error::Storage(e.to_string())
        })?;

        tracing::debug!(
            command_host = %settings.command_host,
            command_port = settings.command_port,
            "Camera settings persisted"
        );
        self.tx.send_replace(record.to_settings());
        Ok(())
    }
}

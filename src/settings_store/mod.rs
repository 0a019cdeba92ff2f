//! Settings Store - Single Source of Truth for camera settings
//!
//! ## Responsibilities
//!
//! - Hold at most one `CameraSettings` value, durably
//! - Publish it as a live value: new subscribers see the latest value
//!   immediately, then every committed update
//!
//! ## Design Principles
//!
//! - The store does not validate field values; callers do
//! - Unconfigured settings are published as `None`

mod repository;
mod types;

pub use repository::FileSettingsStore;
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// Live settings receiver (`None` = not configured)
pub type SettingsRx = watch::Receiver<Option<CameraSettings>>;

/// Consumed interface of any settings backend
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Subscribe to the live settings value
    fn read_live(&self) -> SettingsRx;

    /// Persist settings and publish them to subscribers
    ///
    /// Fails with `Error::Storage` when the value could not be made durable.
    async fn write(&self, settings: CameraSettings) -> Result<()>;
}

/// Volatile store, used when nothing needs to survive a restart
pub struct MemorySettingsStore {
    tx: watch::Sender<Option<CameraSettings>>,
}

impl MemorySettingsStore {
    /// Create store holding `initial`
    pub fn new(initial: Option<CameraSettings>) -> Self {
        let (tx, _) = watch::channel(initial.filter(CameraSettings::is_configured));
        Self { tx }
    }

    /// Replace the stored value without validation
    pub fn replace(&self, settings: Option<CameraSettings>) {
        self.tx.send_replace(settings.filter(CameraSettings::is_configured));
    }

    /// Current value
    pub fn current(&self) -> Option<CameraSettings> {
        self.tx.borrow().clone()
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    fn read_live(&self) -> SettingsRx {
        self.tx.subscribe()
    }

    async fn write(&self, settings: CameraSettings) -> Result<()> {
        self.replace(Some(settings));
        Ok(())
    }
}

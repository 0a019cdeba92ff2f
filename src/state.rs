//! Application state
//!
//! Holds configuration and the wired-up components

use crate::camera_controller::{CameraController, DEFAULT_EVENT_CAPACITY};
use crate::command_client::{CommandDispatcher, HttpCommandTransport, DEFAULT_COMMAND_TIMEOUT_SECS};
use crate::settings_store::FileSettingsStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Persisted camera settings record
    pub settings_path: PathBuf,
    /// Connect/read/total timeout for camera commands
    pub command_timeout: Duration,
    /// Buffer of the one-shot event channels
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: std::env::var("ELECAM_SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("camera_settings.json")),
            command_timeout: Duration::from_secs(
                std::env::var("ELECAM_COMMAND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
            ),
            event_capacity: std::env::var("ELECAM_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|cap| *cap > 0)
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
        }
    }
}

/// Application state shared across the front end
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Settings Store (SSoT for camera settings)
    pub settings_store: Arc<FileSettingsStore>,
    /// CameraController (already following the store)
    pub controller: CameraController,
}

impl AppState {
    /// Open the settings store and start the controller
    pub async fn initialize(config: AppConfig) -> crate::Result<Self> {
        let settings_store = Arc::new(FileSettingsStore::open(&config.settings_path).await);

        let transport = Arc::new(HttpCommandTransport::with_timeout(config.command_timeout)?);
        let dispatcher = CommandDispatcher::new(transport);

        let controller =
            CameraController::with_capacity(settings_store.clone(), dispatcher, config.event_capacity);
        controller.start();

        tracing::info!(
            settings_path = %config.settings_path.display(),
            command_timeout_secs = config.command_timeout.as_secs(),
            "CameraController initialized"
        );

        Ok(Self {
            config,
            settings_store,
            controller,
        })
    }
}

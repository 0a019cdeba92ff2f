//! CameraController - command orchestration for one camera
//!
//! ## Responsibilities
//!
//! - Mirror the Settings Store's live value into `ControllerState`
//! - Serialize device commands: at most one in flight, extra calls dropped
//! - Run connection tests independently of the command slot
//! - Publish state, one-shot events, testing flag and test results
//!
//! ## Concurrency
//!
//! `ControllerState` has a single writer (this controller). Every mutation
//! goes through the state channel and no lock is held across a network or
//! store call. Dispatched commands run on their own task, so dropping the
//! caller's future never leaves the command slot occupied.

mod types;

pub use types::*;

use crate::command_client::{CommandDispatcher, CommandResult};
use crate::error::Result;
use crate::settings_store::{CameraSettings, SettingsStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

/// Default buffer of the one-shot channels
pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// Result of claiming the command slot
enum SlotClaim {
    Claimed(CameraSettings),
    Busy,
    SettingsRequired(String),
}

struct ControllerInner {
    store: Arc<dyn SettingsStore>,
    dispatcher: CommandDispatcher,
    state_tx: watch::Sender<ControllerState>,
    events_tx: broadcast::Sender<ControllerEvent>,
    testing_tx: watch::Sender<bool>,
    test_results_tx: broadcast::Sender<CommandResult>,
    /// A settings prompt was issued for the current unconfigured episode
    prompted_for_settings: AtomicBool,
}

/// CameraController instance (cheap to clone, clones share state)
#[derive(Clone)]
pub struct CameraController {
    inner: Arc<ControllerInner>,
}

impl CameraController {
    /// Create controller; call `start` to follow the settings store
    pub fn new(store: Arc<dyn SettingsStore>, dispatcher: CommandDispatcher) -> Self {
        Self::with_capacity(store, dispatcher, DEFAULT_EVENT_CAPACITY)
    }

    /// Create controller with a custom one-shot buffer size
    pub fn with_capacity(
        store: Arc<dyn SettingsStore>,
        dispatcher: CommandDispatcher,
        capacity: usize,
    ) -> Self {
        let (state_tx, _) = watch::channel(ControllerState::default());
        let (events_tx, _) = broadcast::channel(capacity.max(1));
        let (testing_tx, _) = watch::channel(false);
        let (test_results_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            inner: Arc::new(ControllerInner {
                store,
                dispatcher,
                state_tx,
                events_tx,
                testing_tx,
                test_results_tx,
                prompted_for_settings: AtomicBool::new(false),
            }),
        }
    }

    /// Follow the settings store
    ///
    /// The current store value is applied before this returns; later values
    /// are applied by the returned task, which ends once the controller or
    /// the store is dropped.
    pub fn start(&self) -> JoinHandle<()> {
        let mut rx = self.inner.store.read_live();
        let initial = rx.borrow_and_update().clone();
        self.inner.apply_settings(initial);

        let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let settings = rx.borrow_and_update().clone();
                match weak.upgrade() {
                    Some(inner) => inner.apply_settings(settings),
                    None => break,
                }
            }
            tracing::debug!("Settings subscription ended");
        })
    }

    // ========================================
    // Observers
    // ========================================

    /// Snapshot of the current state
    pub fn state(&self) -> ControllerState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ControllerState> {
        self.inner.state_tx.subscribe()
    }

    pub fn state_stream(&self) -> WatchStream<ControllerState> {
        WatchStream::new(self.subscribe_state())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.inner.events_tx.subscribe()
    }

    pub fn event_stream(&self) -> BroadcastStream<ControllerEvent> {
        BroadcastStream::new(self.subscribe_events())
    }

    /// Connection test in progress
    pub fn is_testing_connection(&self) -> bool {
        *self.inner.testing_tx.borrow()
    }

    pub fn subscribe_testing(&self) -> watch::Receiver<bool> {
        self.inner.testing_tx.subscribe()
    }

    pub fn subscribe_test_results(&self) -> broadcast::Receiver<CommandResult> {
        self.inner.test_results_tx.subscribe()
    }

    pub fn test_result_stream(&self) -> BroadcastStream<CommandResult> {
        BroadcastStream::new(self.subscribe_test_results())
    }

    /// Stream address for the video collaborator, if configured
    pub fn stream_url(&self) -> Option<String> {
        self.inner
            .state_tx
            .borrow()
            .settings
            .as_ref()
            .map(|s| s.stream_url.clone())
    }

    // ========================================
    // Settings
    // ========================================

    /// Ask the UI to show the settings dialog
    pub fn request_settings_dialog(&self) {
        self.inner.emit(ControllerEvent::RequestSettings(None));
    }

    /// Validate and persist new settings
    ///
    /// `ControllerState.settings` is NOT touched here; it follows the store.
    pub async fn update_camera_settings(&self, settings: CameraSettings) -> Result<()> {
        let settings = settings.normalized();
        if let Err(e) = settings.validate() {
            tracing::warn!(error = %e, "Rejected camera settings");
            self.inner
                .emit(ControllerEvent::RequestSettings(Some(e.to_string())));
            return Err(e);
        }

        if let Err(e) = self.inner.store.write(settings).await {
            self.inner.emit(ControllerEvent::ShowMessage(format!(
                "Failed to save camera settings: {}",
                e
            )));
            return Err(e);
        }

        Ok(())
    }

    // ========================================
    // Commands
    // ========================================

    pub async fn take_photo(&self) -> CommandOutcome {
        self.run_command(CommandAction::TakePhoto).await
    }

    pub async fn start_recording(&self) -> CommandOutcome {
        self.run_command(CommandAction::StartRecording).await
    }

    pub async fn stop_recording(&self) -> CommandOutcome {
        self.run_command(CommandAction::StopRecording).await
    }

    /// Switch between record (`true`) and photo (`false`) mode
    pub async fn set_record_mode(&self, record_mode: bool) -> CommandOutcome {
        self.run_command(CommandAction::SetRecordMode(record_mode)).await
    }

    async fn run_command(&self, action: CommandAction) -> CommandOutcome {
        let settings = match self.inner.claim_slot() {
            SlotClaim::Claimed(settings) => settings,
            SlotClaim::Busy => {
                tracing::debug!(action = ?action, "Command slot busy, call dropped");
                return CommandOutcome::Busy;
            }
            SlotClaim::SettingsRequired(reason) => {
                tracing::info!(action = ?action, reason = %reason, "Command needs settings");
                self.inner
                    .emit(ControllerEvent::RequestSettings(Some(reason)));
                return CommandOutcome::SettingsRequired;
            }
        };

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.execute_claimed(action, settings).await });

        match task.await {
            Ok(result) => CommandOutcome::Completed(result),
            Err(e) => {
                tracing::error!(action = ?action, error = %e, "Command task aborted");
                self.inner
                    .state_tx
                    .send_modify(|s| s.is_executing_command = false);
                let result = CommandResult::failure(types::messages::COMMAND_FAILED);
                self.inner.emit(ControllerEvent::CommandCompleted {
                    action,
                    result: result.clone(),
                });
                CommandOutcome::Completed(result)
            }
        }
    }

    // ========================================
    // Connection test
    // ========================================

    /// Probe the camera with `settings` (not necessarily the saved ones)
    ///
    /// Independent of the command slot; concurrent tests are allowed and the
    /// testing flag simply tracks the latest transition.
    pub async fn test_camera_connection(&self, settings: CameraSettings) -> CommandResult {
        let settings = settings.normalized();
        if let Err(e) = settings.validate() {
            let result = CommandResult::failure(e.to_string());
            self.inner.publish_test_result(result.clone());
            return result;
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            inner.testing_tx.send_replace(true);
            let result = inner.dispatcher.test_connection(&settings).await;
            inner.testing_tx.send_replace(false);

            let message = match result.message.clone() {
                Some(message) => message,
                None if result.success => types::messages::TEST_CONNECTION_SUCCESS.to_string(),
                None => types::messages::TEST_CONNECTION_FAILED.to_string(),
            };
            let result = result.with_message(message);

            tracing::info!(
                command_host = %settings.command_host,
                success = result.success,
                "Camera connection test finished"
            );
            inner.publish_test_result(result.clone());
            result
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Connection test task aborted");
                self.inner.testing_tx.send_replace(false);
                let result = CommandResult::failure(types::messages::TEST_CONNECTION_FAILED);
                self.inner.publish_test_result(result.clone());
                result
            }
        }
    }
}

impl ControllerInner {
    fn emit(&self, event: ControllerEvent) {
        // no receivers is fine: one-shot events are never retained
        if self.events_tx.send(event).is_err() {
            tracing::trace!("Controller event had no subscribers");
        }
    }

    fn publish_test_result(&self, result: CommandResult) {
        if self.test_results_tx.send(result).is_err() {
            tracing::trace!("Test result had no subscribers");
        }
    }

    /// Check settings then claim the command slot, atomically
    fn claim_slot(&self) -> SlotClaim {
        let mut claim = SlotClaim::Busy;
        self.state_tx.send_if_modified(|state| {
            let Some(settings) = state.settings.as_ref() else {
                claim = SlotClaim::SettingsRequired(types::messages::SETTINGS_MISSING.to_string());
                return false;
            };
            if let Err(e) = settings.validate() {
                claim = SlotClaim::SettingsRequired(e.to_string());
                return false;
            }
            if state.is_executing_command {
                claim = SlotClaim::Busy;
                return false;
            }
            claim = SlotClaim::Claimed(settings.clone());
            state.is_executing_command = true;
            true
        });
        claim
    }

    /// Dispatch a command whose slot is already claimed, then release it
    async fn execute_claimed(&self, action: CommandAction, settings: CameraSettings) -> CommandResult {
        let result = self.dispatcher.execute(&settings, action.command()).await;

        self.state_tx.send_modify(|state| {
            state.is_executing_command = false;
            if let (true, CommandAction::SetRecordMode(record_mode)) = (result.success, action) {
                state.is_record_mode = Some(record_mode);
            }
        });

        let result = if result.success {
            result.with_message(action.success_message())
        } else {
            let message = result
                .message
                .clone()
                .unwrap_or_else(|| types::messages::COMMAND_FAILED.to_string());
            tracing::warn!(action = ?action, message = %message, "Camera command failed");
            result.with_message(message)
        };

        self.emit(ControllerEvent::CommandCompleted {
            action,
            result: result.clone(),
        });
        result
    }

    /// React to a value from the settings store
    fn apply_settings(&self, settings: Option<CameraSettings>) {
        let settings = settings.filter(CameraSettings::is_configured);
        let configured = settings.is_some();

        self.state_tx.send_modify(|state| {
            state.settings = settings;
            if !configured {
                state.is_record_mode = None;
            }
        });

        if configured {
            if self.prompted_for_settings.swap(false, Ordering::SeqCst) {
                tracing::info!("Camera settings configured");
            }
        } else if !self.prompted_for_settings.swap(true, Ordering::SeqCst) {
            tracing::info!("Camera settings missing, requesting configuration");
            self.emit(ControllerEvent::RequestSettings(None));
        }
    }
}

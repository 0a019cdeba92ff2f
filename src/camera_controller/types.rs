//! Camera Controller type definitions

use crate::command_client::{CameraCommand, CommandResult};
use crate::settings_store::CameraSettings;
use serde::{Deserialize, Serialize};

/// User-facing messages
pub mod messages {
    pub const PHOTO_SUCCESS: &str = "Photo captured";
    pub const START_RECORDING_SUCCESS: &str = "Recording started";
    pub const STOP_RECORDING_SUCCESS: &str = "Recording stopped";
    pub const RECORD_MODE: &str = "Switched to record mode";
    pub const PHOTO_MODE: &str = "Switched to photo mode";
    pub const COMMAND_FAILED: &str = "Camera command failed";
    pub const SETTINGS_MISSING: &str = "Camera settings are missing. Please configure the camera first.";
    pub const TEST_CONNECTION_SUCCESS: &str = "Camera connection succeeded";
    pub const TEST_CONNECTION_FAILED: &str = "Camera connection failed";
}

/// Command-issuing action, tagged so completions can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "record_mode", rename_all = "snake_case")]
pub enum CommandAction {
    TakePhoto,
    StartRecording,
    StopRecording,
    SetRecordMode(bool),
}

impl CommandAction {
    /// Protocol command behind this action
    pub fn command(&self) -> CameraCommand {
        match self {
            Self::TakePhoto => CameraCommand::TakePhoto,
            Self::StartRecording => CameraCommand::StartRecording,
            Self::StopRecording => CameraCommand::StopRecording,
            Self::SetRecordMode(on) => CameraCommand::SetRecordMode(*on),
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::TakePhoto => messages::PHOTO_SUCCESS,
            Self::StartRecording => messages::START_RECORDING_SUCCESS,
            Self::StopRecording => messages::STOP_RECORDING_SUCCESS,
            Self::SetRecordMode(true) => messages::RECORD_MODE,
            Self::SetRecordMode(false) => messages::PHOTO_MODE,
        }
    }
}

/// Live controller state, read-only for observers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Latest configured settings observed from the store
    pub settings: Option<CameraSettings>,
    /// A command occupies the command slot
    pub is_executing_command: bool,
    /// Last mode confirmed by the device (`true` = record)
    pub is_record_mode: Option<bool>,
}

/// One-shot notification, delivered only to subscribers active at emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ControllerEvent {
    ShowMessage(String),
    /// Ask the user for settings, optionally saying why
    RequestSettings(Option<String>),
    CommandCompleted {
        action: CommandAction,
        result: CommandResult,
    },
}

/// What happened to a command-issuing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Dispatched and resolved (successfully or not)
    Completed(CommandResult),
    /// Dropped because another command was in flight
    Busy,
    /// Not dispatched: settings absent or invalid
    SettingsRequired,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(result) if result.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_commands() {
        assert_eq!(CommandAction::TakePhoto.command().code(), "1001");
        assert_eq!(CommandAction::StartRecording.command().parameter(), "1");
        assert_eq!(
            CommandAction::SetRecordMode(false).command(),
            CameraCommand::SetRecordMode(false)
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = ControllerEvent::CommandCompleted {
            action: CommandAction::SetRecordMode(true),
            result: CommandResult::success_with_message(messages::RECORD_MODE),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "command_completed");
        assert_eq!(json["data"]["action"]["action"], "set_record_mode");
        assert_eq!(json["data"]["action"]["record_mode"], true);
        assert_eq!(json["data"]["result"]["message"], messages::RECORD_MODE);
    }
}

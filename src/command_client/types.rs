//! Command Client type definitions

use serde::{Deserialize, Serialize};

/// Camera operations reachable through the command protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraCommand {
    TakePhoto,
    StartRecording,
    StopRecording,
    /// `true` = record mode, `false` = photo mode
    SetRecordMode(bool),
    /// Health check, no effect on the device
    TestConnection,
}

impl CameraCommand {
    /// Protocol command code (`cmd=`)
    pub fn code(&self) -> &'static str {
        match self {
            Self::TakePhoto => "1001",
            Self::StartRecording | Self::StopRecording => "2001",
            Self::SetRecordMode(_) => "3001",
            Self::TestConnection => "3010",
        }
    }

    /// Protocol parameter (`par=`)
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::TakePhoto | Self::StopRecording | Self::TestConnection => "0",
            Self::StartRecording => "1",
            Self::SetRecordMode(true) => "1",
            Self::SetRecordMode(false) => "0",
        }
    }
}

/// Outcome of one command attempt against the camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn success_with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Same outcome with the message replaced
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            success: self.success,
            message: Some(message.into()),
        }
    }
}

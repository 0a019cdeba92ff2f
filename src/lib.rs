//! elecam-control
//!
//! Control client for a network-attached action camera
//!
//! ## Architecture
//!
//! 1. SettingsStore - SSoT for the camera connection settings
//! 2. CommandClient - command URL building and the HTTP GET transport
//! 3. CameraController - command slot, connection tests, state and events
//!
//! UI layers consume `CameraController` through its state/event channels only.

pub mod camera_controller;
pub mod command_client;
pub mod error;
pub mod settings_store;
pub mod state;

pub use error::{Error, Result};
pub use state::AppState;

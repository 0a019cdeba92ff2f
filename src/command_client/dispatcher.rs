//! Command Dispatcher
//!
//! Builds `http://<host>[:<port>]/?custom=1&cmd=<code>&par=<parameter>` and
//! hands it to the transport.

use super::transport::CommandTransport;
use super::types::{CameraCommand, CommandResult};
use crate::error::{Error, Result};
use crate::settings_store::{command_base_url, CameraSettings, DEFAULT_COMMAND_PORT};
use reqwest::Url;
use std::sync::Arc;

/// Build the command URL for `settings`
///
/// The port is omitted when it is the default (80).
pub fn build_command_url(
    settings: &CameraSettings,
    command: &str,
    parameter: &str,
) -> Result<Url> {
    let mut url = command_base_url(&settings.command_host)?;

    if settings.command_port != DEFAULT_COMMAND_PORT {
        url.set_port(Some(settings.command_port))
            .map_err(|_| Error::Validation(format!("invalid command port {}", settings.command_port)))?;
    }

    url.query_pairs_mut()
        .append_pair("custom", "1")
        .append_pair("cmd", command)
        .append_pair("par", parameter);

    Ok(url)
}

/// Turns (settings, command) into a single transport call
#[derive(Clone)]
pub struct CommandDispatcher {
    transport: Arc<dyn CommandTransport>,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn CommandTransport>) -> Self {
        Self { transport }
    }

    /// Dispatch a raw (code, parameter) pair; the transport result is returned unchanged
    pub async fn dispatch(
        &self,
        settings: &CameraSettings,
        command: &str,
        parameter: &str,
    ) -> CommandResult {
        let url = match build_command_url(settings, command, parameter) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    command_host = %settings.command_host,
                    error = %e,
                    "Camera command not sent"
                );
                return CommandResult::failure(e.to_string());
            }
        };

        tracing::debug!(url = %url, "Dispatching camera command");
        self.transport.send(&url).await
    }

    /// Dispatch a protocol command
    pub async fn execute(&self, settings: &CameraSettings, command: CameraCommand) -> CommandResult {
        self.dispatch(settings, command.code(), command.parameter()).await
    }

    /// Dispatch the health-check command
    pub async fn test_connection(&self, settings: &CameraSettings) -> CommandResult {
        self.execute(settings, CameraCommand::TestConnection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandTransport for RecordingTransport {
        async fn send(&self, url: &Url) -> CommandResult {
            self.urls.lock().unwrap().push(url.to_string());
            CommandResult::failure("HTTP 503: Service Unavailable")
        }
    }

    fn settings(host: &str, port: u16) -> CameraSettings {
        CameraSettings {
            stream_url: "http://192.168.1.254:8192".to_string(),
            command_host: host.to_string(),
            command_port: port,
        }
    }

    #[test]
    fn test_default_port_is_omitted() {
        let url = build_command_url(&settings("192.168.1.254", 80), "1001", "0").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.254/?custom=1&cmd=1001&par=0");
    }

    #[test]
    fn test_custom_port_is_included() {
        let url = build_command_url(&settings("192.168.1.254", 8080), "2001", "1").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.254:8080/?custom=1&cmd=2001&par=1");
    }

    #[test]
    fn test_hostname_and_ipv6() {
        let url = build_command_url(&settings("camera.local", 80), "3010", "0").unwrap();
        assert_eq!(url.as_str(), "http://camera.local/?custom=1&cmd=3010&par=0");

        let url = build_command_url(&settings("fe80::1", 8080), "3010", "0").unwrap();
        assert_eq!(url.as_str(), "http://[fe80::1]:8080/?custom=1&cmd=3010&par=0");
    }

    #[test]
    fn test_host_with_port_or_path_is_rejected() {
        assert!(build_command_url(&settings("192.168.1.254:8080", 80), "1001", "0").is_err());
        assert!(build_command_url(&settings("192.168.1.254/cgi", 80), "1001", "0").is_err());
        assert!(build_command_url(&settings("user@192.168.1.254", 80), "1001", "0").is_err());
    }

    #[tokio::test]
    async fn test_execute_passes_result_through() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = CommandDispatcher::new(transport.clone());

        let result = dispatcher
            .execute(&settings("192.168.1.254", 80), CameraCommand::StopRecording)
            .await;

        assert_eq!(result, CommandResult::failure("HTTP 503: Service Unavailable"));
        assert_eq!(
            *transport.urls.lock().unwrap(),
            vec!["http://192.168.1.254/?custom=1&cmd=2001&par=0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_host_never_reaches_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = CommandDispatcher::new(transport.clone());

        let result = dispatcher
            .test_connection(&settings("bad host", 80))
            .await;

        assert!(!result.success);
        assert!(transport.urls.lock().unwrap().is_empty());
    }
}

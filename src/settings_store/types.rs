//! Settings Store data types

use crate::error::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default HTTP port of the camera command endpoint
pub const DEFAULT_COMMAND_PORT: u16 = 80;

fn default_command_port() -> u16 {
    DEFAULT_COMMAND_PORT
}

/// Parse a bare command host into `http://<host>/`
///
/// Rejects anything but a hostname, IPv4 or IPv6 literal: no port, path,
/// query or credentials.
pub fn command_base_url(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::Validation("command host is required".to_string()));
    }

    // one ':' is a host:port typo, two or more is an IPv6 literal
    let authority = match host.matches(':').count() {
        0 => host.to_string(),
        1 => {
            return Err(Error::Validation(format!(
                "command host must not include a port: '{}'",
                host
            )))
        }
        _ if host.starts_with('[') => host.to_string(),
        _ => format!("[{}]", host),
    };

    let url = Url::parse(&format!("http://{}/", authority))
        .map_err(|e| Error::Validation(format!("invalid command host '{}': {}", host, e)))?;

    if url.port().is_some()
        || url.path() != "/"
        || url.query().is_some()
        || url.fragment().is_some()
        || !url.username().is_empty()
    {
        return Err(Error::Validation(format!(
            "command host must be a bare hostname or IP: '{}'",
            host
        )));
    }

    Ok(url)
}

/// Network configuration required to reach the action camera
///
/// Immutable value: replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Address of the live video stream (opaque, never parsed)
    pub stream_url: String,
    /// Bare hostname or IP of the command endpoint
    pub command_host: String,
    /// Command endpoint port (1-65535)
    #[serde(default = "default_command_port")]
    pub command_port: u16,
}

impl CameraSettings {
    /// Create validated settings, trimming the text fields
    pub fn new(
        stream_url: impl Into<String>,
        command_host: impl Into<String>,
        command_port: u16,
    ) -> Result<Self> {
        let settings = Self {
            stream_url: stream_url.into().trim().to_string(),
            command_host: command_host.into().trim().to_string(),
            command_port,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Settings with the default command port
    pub fn with_default_port(
        stream_url: impl Into<String>,
        command_host: impl Into<String>,
    ) -> Result<Self> {
        Self::new(stream_url, command_host, DEFAULT_COMMAND_PORT)
    }

    /// Stream URL and command host are both non-blank
    pub fn is_configured(&self) -> bool {
        !self.stream_url.trim().is_empty() && !self.command_host.trim().is_empty()
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.stream_url.trim().is_empty() {
            return Err(Error::Validation("stream URL is required".to_string()));
        }
        command_base_url(&self.command_host)?;
        if self.command_port == 0 {
            return Err(Error::Validation(
                "command port must be between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy with whitespace stripped from the text fields
    pub fn normalized(&self) -> Self {
        Self {
            stream_url: self.stream_url.trim().to_string(),
            command_host: self.command_host.trim().to_string(),
            command_port: self.command_port,
        }
    }
}

/// Persisted key-value record
///
/// Every key is optional on disk; missing or blank text fields mean the
/// camera is not configured, a missing or out-of-range port means 80.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_port: Option<i64>,
}

impl SettingsRecord {
    /// Interpret the record, applying the port default
    pub fn to_settings(&self) -> Option<CameraSettings> {
        let stream_url = self.stream_url.as_deref().unwrap_or_default().trim();
        let command_host = self.command_host.as_deref().unwrap_or_default().trim();
        if stream_url.is_empty() || command_host.is_empty() {
            return None;
        }

        let command_port = match self.command_port {
            None => DEFAULT_COMMAND_PORT,
            Some(port) => match u16::try_from(port) {
                Ok(port) if port != 0 => port,
                _ => {
                    tracing::warn!(port = port, "Stored command port out of range, using default");
                    DEFAULT_COMMAND_PORT
                }
            },
        };

        Some(CameraSettings {
            stream_url: stream_url.to_string(),
            command_host: command_host.to_string(),
            command_port,
        })
    }
}

impl From<&CameraSettings> for SettingsRecord {
    fn from(settings: &CameraSettings) -> Self {
        Self {
            stream_url: Some(settings.stream_url.clone()),
            command_host: Some(settings.command_host.clone()),
            command_port: Some(i64::from(settings.command_port)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let settings = CameraSettings::new("  http://cam:8192 ", " 192.168.1.254\n", 80).unwrap();
        assert_eq!(settings.stream_url, "http://cam:8192");
        assert_eq!(settings.command_host, "192.168.1.254");
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(CameraSettings::new("", "192.168.1.254", 80).is_err());
        assert!(CameraSettings::new("http://cam:8192", "   ", 80).is_err());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let err = CameraSettings::new("http://cam:8192", "192.168.1.254", 0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_validate_rejects_malformed_hosts() {
        for host in ["192.168.1.254:8080", "cam/cgi", "bad host", "user@cam", "cam?x=1"] {
            let err = CameraSettings::new("http://cam:8192", host, 80).unwrap_err();
            assert!(err.is_configuration(), "{}", host);
        }
    }

    #[test]
    fn test_host_with_port_is_reported_as_such() {
        let err = command_base_url("192.168.1.254:8080").unwrap_err();
        assert!(err.to_string().contains("must not include a port"), "{}", err);
    }

    #[test]
    fn test_accepts_bare_hosts() {
        for host in ["192.168.1.254", "camera.local", "fe80::1", "[fe80::1]"] {
            assert!(CameraSettings::new("http://cam:8192", host, 80).is_ok(), "{}", host);
        }
    }

    #[test]
    fn test_record_without_port_uses_default() {
        let record: SettingsRecord =
            serde_json::from_str(r#"{"stream_url":"http://cam:8192","command_host":"cam"}"#)
                .unwrap();
        let settings = record.to_settings().unwrap();
        assert_eq!(settings.command_port, DEFAULT_COMMAND_PORT);
    }

    #[test]
    fn test_record_out_of_range_port_uses_default() {
        let record = SettingsRecord {
            stream_url: Some("http://cam:8192".to_string()),
            command_host: Some("cam".to_string()),
            command_port: Some(70000),
        };
        assert_eq!(record.to_settings().unwrap().command_port, 80);
    }

    #[test]
    fn test_blank_record_is_unconfigured() {
        let record = SettingsRecord {
            stream_url: Some("http://cam:8192".to_string()),
            command_host: Some("  ".to_string()),
            command_port: Some(8080),
        };
        assert!(record.to_settings().is_none());
        assert!(SettingsRecord::default().to_settings().is_none());
    }
}

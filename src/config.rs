//! Configuration
//!
//! Connection parameters for the management endpoint and the settings file
//! that can carry them together with a gather request.

use crate::error::{Error, Result};
use crate::gather::GatherRequest;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Connection
// =============================================================================

/// How to reach and authenticate against a cluster management LIF
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Cluster or SVM management address
    pub hostname: String,
    /// User for basic authentication
    pub username: Option<String>,
    /// Password for basic authentication
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Use HTTPS instead of HTTP
    pub https: bool,
    /// Verify the server certificate
    pub validate_certs: bool,
    /// Override the scheme's default port
    pub http_port: Option<u16>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            username: None,
            password: None,
            https: false,
            validate_certs: true,
            http_port: None,
            timeout_secs: 60,
        }
    }
}

impl ConnectionConfig {
    /// Check that the connection can be attempted
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(Error::Configuration("hostname is required".into()));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(Error::Configuration(
                "password supplied without username".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Configuration("timeout must be positive".into()));
        }
        Ok(())
    }

    /// Root of the REST API, always ending in `/api/`
    pub fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        match self.http_port {
            Some(port) => format!("{}://{}:{}/api/", scheme, self.hostname, port),
            None => format!("{}://{}/api/", scheme, self.hostname),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Settings File
// =============================================================================

/// Contents of a YAML settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub gather: GatherRequest,
}

impl Settings {
    /// Parse settings from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }
}

//! Error types for ONTAP fact gathering
//!
//! Provides structured error types for subset/field validation, the REST
//! transport, paged collection and the cluster create/join workflow.

use crate::domain::ports::{ApiError, ZapiError};
use thiserror::Error;

/// Unified error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Gather Validation Errors
    // =========================================================================
    #[error("Specified subset {name} is not found, supported subsets are {supported:?}")]
    UnknownCategory { name: String, supported: Vec<String> },

    #[error("Error: fields: {fields:?}, only one subset will be allowed.")]
    FieldScopeViolation { fields: Vec<String> },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("{principal} user is not authorized to make {api} api call")]
    Unauthorized { principal: String, api: String },

    #[error("{0}")]
    Transport(ApiError),

    #[error("Malformed response from {api}: {reason}")]
    MalformedResponse { api: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // =========================================================================
    // Cluster Workflow Errors
    // =========================================================================
    #[error("Error creating cluster {cluster_name}: {reason}")]
    ClusterCreate { cluster_name: String, reason: String },

    #[error("Failed to create cluster {cluster_name}: {status_message}")]
    ClusterCreateFailed {
        cluster_name: String,
        status_message: String,
    },

    #[error("Error adding node with ip {ip_address}: {reason}")]
    ClusterJoin { ip_address: String, reason: String },

    #[error("Timed out waiting for {operation} after {polls} polls")]
    ProgressTimeout { operation: String, polls: u32 },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a ZAPI failure raised while creating a cluster
    pub fn cluster_create(cluster_name: &str, error: &ZapiError) -> Self {
        Error::ClusterCreate {
            cluster_name: cluster_name.to_string(),
            reason: error.to_string(),
        }
    }

    /// Wrap a ZAPI failure raised while adding a node
    pub fn cluster_join(ip_address: &str, error: &ZapiError) -> Self {
        Error::ClusterJoin {
            ip_address: ip_address.to_string(),
            reason: error.to_string(),
        }
    }

    /// Check if this error came from the management endpoint or the network
    /// rather than from the caller's input
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Http(_) | Error::ProgressTimeout { .. }
        )
    }

    /// Check if this error was caused by invalid caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnknownCategory { .. }
                | Error::FieldScopeViolation { .. }
                | Error::Configuration(_)
        )
    }

    /// Process exit status reported by the CLI for this error.
    ///
    /// `2` for invalid input, `3` for endpoint or network failures, `1` for
    /// everything else.
    pub fn exit_code(&self) -> u8 {
        if self.is_validation() {
            2
        } else if self.is_transient() {
            3
        } else {
            1
        }
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::UnknownCategory {
            name: "qtree_info".into(),
            supported: vec!["aggregate_info".into(), "volume_info".into()],
        };
        assert_eq!(
            err.to_string(),
            "Specified subset qtree_info is not found, supported subsets are [\"aggregate_info\", \"volume_info\"]"
        );

        let err = Error::Unauthorized {
            principal: "admin".into(),
            api: "storage/volumes".into(),
        };
        assert_eq!(
            err.to_string(),
            "admin user is not authorized to make storage/volumes api call"
        );

        let err = Error::FieldScopeViolation {
            fields: vec!["uuid".into(), "name".into()],
        };
        assert_eq!(
            err.to_string(),
            "Error: fields: [\"uuid\", \"name\"], only one subset will be allowed."
        );
    }

    #[test]
    fn test_error_classification() {
        let transport = Error::Transport(ApiError::new("API not found error"));
        assert!(transport.is_transient());
        assert!(!transport.is_validation());
        assert_eq!(transport.to_string(), "API not found error");

        let config_err = Error::Configuration("max_records must be positive".into());
        assert!(config_err.is_validation());
        assert!(!config_err.is_transient());

        let unauthorized = Error::Unauthorized {
            principal: "admin".into(),
            api: "svm/svms".into(),
        };
        assert!(!unauthorized.is_transient());
        assert!(!unauthorized.is_validation());
    }

    #[test]
    fn test_exit_codes() {
        let validation = Error::FieldScopeViolation {
            fields: vec!["uuid".into()],
        };
        assert_eq!(validation.exit_code(), 2);

        let transport = Error::Transport(ApiError::new("HTTP status 502 Bad Gateway"));
        assert_eq!(transport.exit_code(), 3);

        let timeout = Error::ProgressTimeout {
            operation: "cluster create".into(),
            polls: 90,
        };
        assert_eq!(timeout.exit_code(), 3);

        let unauthorized = Error::Unauthorized {
            principal: "admin".into(),
            api: "cluster".into(),
        };
        assert_eq!(unauthorized.exit_code(), 1);

        let malformed = Error::MalformedResponse {
            api: "storage/volumes".into(),
            reason: "missing records".into(),
        };
        assert_eq!(malformed.exit_code(), 1);
    }

    #[test]
    fn test_cluster_errors_carry_reason() {
        let zapi = ZapiError::new("TEST", "This exception is from the unit test");

        let err = Error::cluster_create("abc", &zapi);
        assert!(err.to_string().starts_with("Error creating cluster abc"));
        assert!(err.to_string().contains("This exception is from the unit test"));

        let err = Error::cluster_join("10.10.10.10", &zapi);
        assert!(err.to_string().starts_with("Error adding node with ip 10.10.10.10"));
    }
}

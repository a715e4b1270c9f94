//! Domain Ports - Core trait definitions for the ONTAP management collaborators
//!
//! These traits define the boundaries between fact gathering / cluster setup
//! and the management endpoints. Adapters implement these traits to provide
//! concrete transports (REST over HTTP, ZAPI, or scripted test doubles).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// REST Query Parameters
// =============================================================================

/// Ordered query parameters for a REST GET
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// An empty parameter list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    /// Look up the first value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

// =============================================================================
// REST Errors
// =============================================================================

/// ONTAP error code returned when the user lacks the role for an API
pub const UNAUTHORIZED_CODE: i64 = 6;

/// Error payload reported by the REST transport
///
/// Mirrors the ONTAP `{"error": {"message", "code", "target"}}` envelope.
/// Network-level failures carry no code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ApiError {
    /// Error without a code
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            target: None,
        }
    }

    /// Error with an ONTAP error code
    pub fn with_code(code: impl ToString, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.to_string()),
            target: None,
        }
    }

    /// Parse the inner object of an ONTAP error envelope.
    ///
    /// ONTAP reports `code` as a string, older releases as a number.
    pub fn from_envelope(error: &Value) -> Self {
        let message = match error.get("message").and_then(Value::as_str) {
            Some(m) => m.to_string(),
            None => error.to_string(),
        };
        let code = error.get("code").and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let target = error
            .get("target")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            message,
            code,
            target,
        }
    }

    /// Numeric value of the code, if any
    pub fn numeric_code(&self) -> Option<i64> {
        self.code.as_deref().and_then(|c| c.trim().parse().ok())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.numeric_code() == Some(UNAUTHORIZED_CODE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.target) {
            (Some(code), Some(target)) => {
                write!(f, "{} (code {}, target {})", self.message, code, target)
            }
            (Some(code), None) => write!(f, "{} (code {})", self.message, code),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// REST Transport Port
// =============================================================================

/// Port for the ONTAP REST API
///
/// Paths are relative to the API root (`storage/volumes`, not
/// `/api/storage/volumes`) and may carry their own query string.
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Issue a GET and return the decoded JSON body
    async fn get(&self, path: &str, query: &Query) -> std::result::Result<Value, ApiError>;

    /// User the transport authenticates as
    fn principal(&self) -> Option<&str>;
}

// =============================================================================
// ZAPI Port
// =============================================================================

/// A ZAPI call: API name plus its arguments as a nested attribute tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZapiRequest {
    pub api: String,
    pub args: Value,
}

impl ZapiRequest {
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            args: Value::Object(Default::default()),
        }
    }

    pub fn with_args(api: impl Into<String>, args: Value) -> Self {
        Self {
            api: api.into(),
            args,
        }
    }
}

/// Error raised by a ZAPI call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZapiError {
    pub code: String,
    pub message: String,
}

impl ZapiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ZapiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetApp API failed. Reason - {}:{}", self.code, self.message)
    }
}

impl std::error::Error for ZapiError {}

/// Port for the ONTAP ZAPI (XML/RPC) management API
///
/// Implementations own XML marshaling; results come back as the attribute
/// tree of the response with all leaf values as strings.
#[async_trait]
pub trait ZapiConnection: Send + Sync {
    async fn invoke(&self, request: &ZapiRequest) -> std::result::Result<Value, ZapiError>;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type RestTransportRef = Arc<dyn RestTransport>;
pub type ZapiConnectionRef = Arc<dyn ZapiConnection>;

//! Scripted in-memory transports
//!
//! Replay canned responses in order and record every call, for tests and
//! benchmarks that must not reach a real cluster.

use crate::domain::ports::{ApiError, Query, RestTransport, ZapiConnection, ZapiError, ZapiRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

// =============================================================================
// REST
// =============================================================================

/// A GET issued against a [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub query: Query,
}

/// REST transport answering from a queue of scripted responses
#[derive(Debug, Default)]
pub struct MockTransport {
    principal: Option<String>,
    responses: Mutex<VecDeque<std::result::Result<Value, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Create a transport without a principal
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport acting as `principal`
    pub fn with_principal(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
            ..Default::default()
        }
    }

    /// Queue a successful response body
    pub fn push_ok(&self, body: Value) {
        self.responses.lock().push_back(Ok(body));
    }

    /// Queue a transport error
    pub fn push_err(&self, error: ApiError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of scripted responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl RestTransport for MockTransport {
    async fn get(&self, path: &str, query: &Query) -> std::result::Result<Value, ApiError> {
        self.calls.lock().push(RecordedCall {
            path: path.to_string(),
            query: query.clone(),
        });

        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::new(format!("no scripted response for {}", path))))
    }

    fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }
}

// =============================================================================
// ZAPI
// =============================================================================

/// ZAPI connection answering from a queue of scripted results
#[derive(Debug, Default)]
pub struct MockZapiConnection {
    responses: Mutex<VecDeque<std::result::Result<Value, ZapiError>>>,
    requests: Mutex<Vec<ZapiRequest>>,
}

impl MockZapiConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, attributes: Value) {
        self.responses.lock().push_back(Ok(attributes));
    }

    pub fn push_err(&self, error: ZapiError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ZapiRequest> {
        self.requests.lock().clone()
    }

    /// Names of the APIs invoked so far
    pub fn invoked_apis(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.api.clone()).collect()
    }
}

#[async_trait]
impl ZapiConnection for MockZapiConnection {
    async fn invoke(&self, request: &ZapiRequest) -> std::result::Result<Value, ZapiError> {
        self.requests.lock().push(request.clone());

        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(ZapiError::new(
                "MOCK",
                format!("no scripted response for {}", request.api),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let transport = MockTransport::with_principal("admin");
        transport.push_ok(json!({"version": {"full": "9.8"}}));
        transport.push_err(ApiError::with_code("6", "denied"));
        assert_eq!(transport.remaining(), 2);

        let first = transport
            .get("cluster", &Query::new().with("fields", "version"))
            .await
            .unwrap();
        assert_eq!(first["version"]["full"], json!("9.8"));

        let second = transport.get("svm/svms", &Query::new()).await.unwrap_err();
        assert!(second.is_unauthorized());

        // exhausted queue answers with an error
        assert!(transport.get("storage/volumes", &Query::new()).await.is_err());

        assert_eq!(transport.principal(), Some("admin"));
        let paths: Vec<_> = transport.calls().into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["cluster", "svm/svms", "storage/volumes"]);
    }

    #[tokio::test]
    async fn test_mock_zapi_records_requests() {
        let conn = MockZapiConnection::new();
        conn.push_err(ZapiError::new("TEST", "boom"));

        let err = conn
            .invoke(&ZapiRequest::new("cluster-create"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "TEST");
        assert_eq!(conn.invoked_apis(), vec!["cluster-create"]);
    }
}

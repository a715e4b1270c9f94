//! Management API Transports
//!
//! Provides implementations of the REST and ZAPI ports:
//! - OntapRestClient: HTTP(S) client for the ONTAP REST API
//! - MockTransport / MockZapiConnection: scripted in-memory doubles

pub mod mock;
pub mod rest;

pub use mock::*;
pub use rest::*;

use crate::config::ConnectionConfig;
use crate::domain::ports::RestTransportRef;
use crate::error::Result;
use std::sync::Arc;

/// Factory for creating REST transports
pub struct TransportFactory;

impl TransportFactory {
    /// Create an HTTP transport for the configured cluster
    pub fn rest(config: &ConnectionConfig) -> Result<RestTransportRef> {
        Ok(Arc::new(OntapRestClient::new(config)?))
    }
}

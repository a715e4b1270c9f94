//! ONTAP Facts - configuration fact gathering for NetApp ONTAP clusters
//!
//! Queries the ONTAP REST API for aggregates, SVMs and volumes, draining
//! every paged collection, and drives the ZAPI cluster create/join workflow.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                              Fact Collector                                  │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────────┐  │
//! │  │     Subset      │  │     Field       │  │        Pagination           │  │
//! │  │    Resolver     │─▶│   Projection    │─▶│        Aggregator           │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────┬───────────────┘  │
//! ├──────────────────────────────────────────────────────────┼──────────────────┤
//! │                          Transports                      │                   │
//! │  ┌─────────────────────────────┐  ┌─────────────────────┴───────────────┐   │
//! │  │   ZAPI (cluster setup)      │  │     REST (OntapRestClient)          │   │
//! │  └─────────────────────────────┘  └─────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`gather`]: Subset resolution, field projection and paged collection
//! - [`cluster`]: Cluster create and node join workflow
//! - [`transport`]: REST client and scripted test transports
//! - [`domain`]: Transport ports and desired-state helpers
//! - [`config`]: Connection and settings file
//! - [`error`]: Error types and handling

pub mod cluster;
pub mod config;
pub mod domain;
pub mod error;
pub mod gather;
pub mod transport;

// Re-export commonly used types
pub use cluster::{ClusterOutcome, ClusterSetup, ClusterSetupConfig};

pub use config::{ConnectionConfig, Settings};

pub use domain::modify::{cd_action, is_rename_action, modified_attributes, CdAction};

pub use domain::ports::{
    ApiError, Query, RestTransport, RestTransportRef, ZapiConnection, ZapiConnectionRef,
    ZapiError, ZapiRequest,
};

pub use error::{Error, Result};

pub use gather::{
    collect, resolve, validate, Category, CategoryTable, FactBundle, FactCollector,
    FieldSelector, GatherOutcome, GatherRequest, ResultSet,
};

pub use transport::{MockTransport, MockZapiConnection, OntapRestClient, TransportFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

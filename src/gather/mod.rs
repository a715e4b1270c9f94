//! Fact Gathering
//!
//! Collects ONTAP configuration facts over the REST API:
//! - subset: category table and subset resolution
//! - fields: field projection validation
//! - pagination: draining paged collection endpoints

pub mod fields;
pub mod pagination;
pub mod subset;

pub use fields::*;
pub use pagination::*;
pub use subset::*;

use crate::domain::ports::{Query, RestTransportRef};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Endpoint queried to confirm the cluster speaks the REST API
pub const VERSION_API: &str = "cluster";

/// Default page size bound
pub const DEFAULT_MAX_RECORDS: u32 = 1024;

// =============================================================================
// Request / Outcome
// =============================================================================

/// What to gather
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatherRequest {
    /// Subset names, or `all`
    pub gather_subset: Vec<String>,
    /// Maximum records per page
    pub max_records: u32,
    /// Field projection; `["*"]` for all fields
    pub fields: Option<Vec<String>>,
}

impl Default for GatherRequest {
    fn default() -> Self {
        Self {
            gather_subset: vec![ALL_SUBSETS.to_string()],
            max_records: DEFAULT_MAX_RECORDS,
            fields: None,
        }
    }
}

impl GatherRequest {
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(Error::Configuration(
                "max_records must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

/// Fact bundles keyed by category name, in resolution order
pub type ResultSet = IndexMap<String, FactBundle>;

/// Result of a gather run; gathering never changes the cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatherOutcome {
    pub changed: bool,
    pub state: String,
    pub ontap_info: ResultSet,
}

impl GatherOutcome {
    fn new(ontap_info: ResultSet) -> Self {
        Self {
            changed: false,
            state: "info".to_string(),
            ontap_info,
        }
    }
}

// =============================================================================
// Fact Collector
// =============================================================================

/// Gathers fact categories from one cluster
pub struct FactCollector {
    transport: RestTransportRef,
    table: CategoryTable,
}

impl FactCollector {
    /// Create a collector for the standard ONTAP categories
    pub fn new(transport: RestTransportRef) -> Self {
        Self::with_table(transport, CategoryTable::ontap_rest())
    }

    /// Create a collector with a custom category table
    pub fn with_table(transport: RestTransportRef, table: CategoryTable) -> Self {
        Self { transport, table }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Fetch the cluster version, failing fast when the endpoint is not a
    /// usable REST API
    pub async fn check_version(&self) -> Result<Value> {
        let query = Query::new().with("fields", "version");
        let cluster = self
            .transport
            .get(VERSION_API, &query)
            .await
            .map_err(Error::Transport)?;

        match cluster.pointer("/version/full") {
            Some(full) => info!("Connected to {}", full),
            None => debug!("Cluster version: {}", cluster),
        }

        Ok(cluster)
    }

    /// Run a gather request.
    ///
    /// The request is validated before any I/O. The first failure aborts the
    /// run and no partial result is returned.
    pub async fn gather(&self, request: &GatherRequest) -> Result<GatherOutcome> {
        request.validate()?;
        let categories = resolve(&request.gather_subset, &self.table)?;
        let selector = validate(request.fields.as_deref(), &categories)?;

        self.check_version().await?;

        let mut ontap_info = ResultSet::new();
        for category in &categories {
            if ontap_info.contains_key(&category.name) {
                debug!("Subset {} already gathered", category.name);
                continue;
            }

            info!("Gathering {} from {}", category.name, category.api);
            let bundle = collect(
                self.transport.as_ref(),
                &category.api,
                request.max_records,
                &selector,
            )
            .await?;
            info!("Gathered {} records for {}", bundle.num_records, category.name);

            ontap_info.insert(category.name.clone(), bundle);
        }

        Ok(GatherOutcome::new(ontap_info))
    }
}

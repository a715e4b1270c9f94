//! Paged collection
//!
//! ONTAP list endpoints return at most `max_records` records per response and
//! a `_links.next.href` continuation while more remain. A category is only
//! complete once every continuation has been followed.

use super::fields::FieldSelector;
use crate::domain::ports::{ApiError, Query, RestTransport};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Prefix ONTAP puts on continuation links
pub const API_ROOT: &str = "/api";

/// Principal reported when the transport has no user
const UNKNOWN_PRINCIPAL: &str = "anonymous";

/// An opaque record returned by a collection endpoint
pub type Record = Map<String, Value>;

// =============================================================================
// Response Shapes
// =============================================================================

/// A link object, `{"href": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// The `_links` object of a collection response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    /// `self` and any other links, kept as returned
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One response of a paged collection endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultPage {
    pub records: Vec<Record>,
    #[serde(rename = "_links")]
    pub links: Links,
    /// Count reported by the server for this page only
    #[serde(default)]
    pub num_records: Option<u64>,
    /// Remaining top-level members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultPage {
    /// Validate the shape of a successful response body
    pub fn parse(api: &str, body: Value) -> Result<Self> {
        serde_json::from_value(body).map_err(|e| Error::MalformedResponse {
            api: api.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn next_href(&self) -> Option<&str> {
        self.links.next.as_ref().map(|l| l.href.as_str())
    }

    /// Reported count when it disagrees with the records on this page
    pub fn count_mismatch(&self) -> Option<u64> {
        self.num_records
            .filter(|&reported| reported as usize != self.records.len())
    }
}

// =============================================================================
// Fact Bundle
// =============================================================================

/// Every record of one category, gathered across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactBundle {
    /// Links of the last page fetched
    #[serde(rename = "_links")]
    pub links: Links,
    /// Records of all pages, in fetch order
    pub records: Vec<Record>,
    /// Length of `records`
    pub num_records: usize,
    /// Top-level members of the first page
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FactBundle {
    fn from_first_page(page: ResultPage) -> Self {
        let num_records = page.records.len();
        Self {
            links: page.links,
            records: page.records,
            num_records,
            extra: page.extra,
        }
    }

    /// Fold a continuation page into the bundle
    fn absorb(&mut self, page: ResultPage) {
        self.links = page.links;
        self.records.extend(page.records);
    }

    fn next_href(&self) -> Option<&str> {
        self.links.next.as_ref().map(|l| l.href.as_str())
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Turn a continuation href into a path relative to the API root.
///
/// `/api/storage/volumes?start.uuid=x` becomes `storage/volumes?start.uuid=x`.
/// Hrefs without the prefix are only stripped of their leading slash.
pub fn strip_api_root(href: &str) -> &str {
    let path = match href.strip_prefix(API_ROOT) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
        _ => href,
    };
    path.trim_start_matches('/')
}

/// Map an error from the initial fetch of `api`
fn initial_fetch_error(transport: &dyn RestTransport, api: &str, error: ApiError) -> Error {
    if error.is_unauthorized() {
        Error::Unauthorized {
            principal: transport
                .principal()
                .unwrap_or(UNKNOWN_PRINCIPAL)
                .to_string(),
            api: api.to_string(),
        }
    } else {
        Error::Transport(error)
    }
}

fn warn_on_count_mismatch(api: &str, page: &ResultPage) {
    if let Some(reported) = page.count_mismatch() {
        warn!(
            "{} reported {} records but returned {}",
            api,
            reported,
            page.records.len()
        );
    }
}

/// Fetch every record of the collection at `api`.
///
/// The first request carries `max_records` and the field projection.
/// Continuations are fetched exactly as the server linked them, without
/// extra parameters, until a page arrives without `_links.next`.
pub async fn collect(
    transport: &dyn RestTransport,
    api: &str,
    max_records: u32,
    fields: &FieldSelector,
) -> Result<FactBundle> {
    let mut query = Query::new().with("max_records", max_records);
    if let Some(projection) = fields.query_value() {
        query = query.with("fields", projection);
    }

    let body = transport
        .get(api, &query)
        .await
        .map_err(|e| initial_fetch_error(transport, api, e))?;
    let first = ResultPage::parse(api, body)?;
    warn_on_count_mismatch(api, &first);

    let mut bundle = FactBundle::from_first_page(first);
    let mut pages = 1usize;

    while let Some(href) = bundle.next_href() {
        let next_api = strip_api_root(href).to_string();
        debug!("Following continuation {} for {} (page {})", next_api, api, pages + 1);

        let body = transport
            .get(&next_api, &Query::new())
            .await
            .map_err(Error::Transport)?;
        let page = ResultPage::parse(&next_api, body)?;
        warn_on_count_mismatch(&next_api, &page);

        bundle.absorb(page);
        pages += 1;
    }

    bundle.num_records = bundle.records.len();

    debug!(
        "Collected {} records from {} in {} page(s)",
        bundle.num_records, api, pages
    );

    Ok(bundle)
}

//! Gather subsets
//!
//! Maps fact categories to the REST collections that back them and resolves
//! a requested subset list against that table.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sentinel subset name selecting every known category
pub const ALL_SUBSETS: &str = "all";

// =============================================================================
// Category
// =============================================================================

/// A fact category and the REST collection it is gathered from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Subset name, e.g. `volume_info`
    pub name: String,
    /// Collection path relative to the API root, e.g. `storage/volumes`
    pub api: String,
}

impl Category {
    pub fn new(name: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api: api.into(),
        }
    }
}

// =============================================================================
// Category Table
// =============================================================================

/// Immutable, ordered table of known categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Build a table; order of `categories` is the canonical order
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Categories served by the ONTAP 9.6+ REST API
    pub fn ontap_rest() -> Self {
        Self::new(vec![
            Category::new("aggregate_info", "storage/aggregates"),
            Category::new("vserver_info", "svm/svms"),
            Category::new("volume_info", "storage/volumes"),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category names in canonical order
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::ontap_rest()
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve requested subset names against `known`.
///
/// Any occurrence of `all` selects the whole table in canonical order.
/// Otherwise names are looked up in request order and the first unknown
/// name fails the resolution. Duplicates are kept.
pub fn resolve<S: AsRef<str>>(requested: &[S], known: &CategoryTable) -> Result<Vec<Category>> {
    if requested.iter().any(|name| name.as_ref() == ALL_SUBSETS) {
        return Ok(known.categories.clone());
    }

    requested
        .iter()
        .map(|name| {
            let name = name.as_ref();
            known.get(name).cloned().ok_or_else(|| Error::UnknownCategory {
                name: name.to_string(),
                supported: known.names(),
            })
        })
        .collect()
}

//! Field projection
//!
//! Turns the optional `fields` request into the projection sent with the
//! initial fetch of each category.

use super::subset::Category;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Wildcard requesting every field
pub const ALL_FIELDS: &str = "*";

/// Projection applied to a collection fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSelector {
    /// No `fields` parameter; the server picks its default projection
    ServerDefault,
    /// Explicit `fields=*`
    All,
    /// Explicit field list, in request order
    Fields(Vec<String>),
}

impl FieldSelector {
    /// Whether this selector returns every field the server offers
    pub fn is_wildcard(&self) -> bool {
        !matches!(self, FieldSelector::Fields(_))
    }

    /// Value of the `fields` query parameter, if one is sent
    pub fn query_value(&self) -> Option<String> {
        match self {
            FieldSelector::ServerDefault => None,
            FieldSelector::All => Some(ALL_FIELDS.to_string()),
            FieldSelector::Fields(fields) => Some(fields.join(",")),
        }
    }
}

impl Default for FieldSelector {
    fn default() -> Self {
        FieldSelector::ServerDefault
    }
}

/// Validate a field request against the resolved categories.
///
/// A list that joins to `*` is the wildcard and combines with any number of
/// categories. Any other list is only accepted for a single category.
pub fn validate(fields: Option<&[String]>, categories: &[Category]) -> Result<FieldSelector> {
    let Some(fields) = fields else {
        return Ok(FieldSelector::ServerDefault);
    };

    if fields.join(",") == ALL_FIELDS {
        return Ok(FieldSelector::All);
    }

    if categories.len() != 1 {
        return Err(Error::FieldScopeViolation {
            fields: fields.to_vec(),
        });
    }

    Ok(FieldSelector::Fields(fields.to_vec()))
}

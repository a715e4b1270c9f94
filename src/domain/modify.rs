//! Desired-state comparison helpers
//!
//! Decide whether a resource must be created or deleted and which of its
//! attributes differ between the current and the desired state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map describing a resource
pub type Attributes = Map<String, Value>;

/// Create/delete decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CdAction {
    Create,
    Delete,
}

impl std::fmt::Display for CdAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CdAction::Create => write!(f, "create"),
            CdAction::Delete => write!(f, "delete"),
        }
    }
}

/// Decide between create, delete or nothing.
///
/// `desired["state"]` defaults to `present`.
pub fn cd_action(current: Option<&Attributes>, desired: &Attributes) -> Option<CdAction> {
    let desired_state = desired
        .get("state")
        .and_then(Value::as_str)
        .unwrap_or("present");

    match (current, desired_state) {
        (None, "absent") => None,
        (Some(_), "present") => None,
        (Some(_), _) => Some(CdAction::Delete),
        (None, _) => Some(CdAction::Create),
    }
}

/// Attributes of `desired` whose values differ from `current`.
///
/// Keys missing from `current` are ignored. Nested objects are compared
/// recursively and lists as multisets. With `list_diff`, a changed list is
/// reported as the desired items absent from the current list rather than
/// the whole desired list.
pub fn modified_attributes(
    current: Option<&Attributes>,
    desired: &Attributes,
    list_diff: bool,
) -> Attributes {
    let mut modified = Map::new();
    let Some(current) = current else {
        return modified;
    };

    for (key, value) in desired {
        let Some(current_value) = current.get(key) else {
            continue;
        };
        match (current_value, value) {
            (Value::Array(cur), Value::Array(des)) => {
                if let Some(list) = compare_lists(cur, des, list_diff) {
                    modified.insert(key.clone(), Value::Array(list));
                }
            }
            (Value::Object(cur), Value::Object(des)) => {
                let nested = modified_attributes(Some(cur), des, false);
                if !nested.is_empty() {
                    modified.insert(key.clone(), Value::Object(nested));
                }
            }
            (cur, des) => {
                if cur != des {
                    modified.insert(key.clone(), des.clone());
                }
            }
        }
    }

    modified
}

/// Multiset comparison of two lists; `None` when they hold the same items
fn compare_lists(current: &[Value], desired: &[Value], list_diff: bool) -> Option<Vec<Value>> {
    let mut leftover: Vec<&Value> = current.iter().collect();
    let mut missing = Vec::new();

    for item in desired {
        match leftover.iter().position(|c| *c == item) {
            Some(pos) => {
                leftover.remove(pos);
            }
            None => missing.push(item.clone()),
        }
    }

    if missing.is_empty() && leftover.is_empty() {
        None
    } else if list_diff {
        Some(missing)
    } else {
        Some(desired.to_vec())
    }
}

/// Whether `source` should be renamed to `target`.
///
/// `None` when neither exists, `true` when only the source exists.
pub fn is_rename_action<T>(source: Option<&T>, target: Option<&T>) -> Option<bool> {
    match (source, target) {
        (None, None) => None,
        (Some(_), None) => Some(true),
        _ => Some(false),
    }
}

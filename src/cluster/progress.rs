//! ZAPI progress records for cluster create and node add

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Status values reported while an operation is still running
const RUNNING_STATES: [&str; 2] = ["in_progress", "pending"];

/// ZAPI encodes booleans as the strings `true` / `false`
fn zapi_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(raw.as_deref().map(str::trim), Some("true")))
}

/// `cluster-create-join-progress-info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateJoinProgress {
    #[serde(default, deserialize_with = "zapi_bool")]
    pub is_complete: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_status_message: Option<String>,
}

impl CreateJoinProgress {
    /// Extract from a `cluster-create-join-progress-get` result
    pub fn from_response(response: &Value) -> Option<Self> {
        let info = response.pointer("/attributes/cluster-create-join-progress-info")?;
        serde_json::from_value(info.clone()).ok()
    }

    /// Whether polling can stop
    pub fn is_settled(&self) -> bool {
        self.is_complete || matches!(self.status.as_deref(), Some("success") | Some("failed"))
    }

    pub fn succeeded(&self) -> bool {
        self.is_complete || self.status.as_deref() == Some("success")
    }
}

/// `cluster-create-add-node-status-info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddNodeStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub failure_msg: Option<String>,
}

impl AddNodeStatus {
    /// Extract from a `cluster-add-node-status-get-iter` result; `None` when
    /// no status record has been published yet
    pub fn from_response(response: &Value) -> Option<Self> {
        let published = response
            .get("num-records")
            .and_then(Value::as_str)
            .map_or(true, |n| n.trim().parse::<u64>().map_or(false, |n| n > 0));
        if !published {
            return None;
        }

        let info = response.pointer("/attributes-list/cluster-create-add-node-status-info")?;
        serde_json::from_value(info.clone()).ok()
    }

    pub fn is_running(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |s| RUNNING_STATES.contains(&s))
    }

    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    /// The node was already a member of a cluster
    pub fn already_in_cluster(&self) -> bool {
        self.failure_msg
            .as_deref()
            .map_or(false, |m| m.contains("Node is already in a cluster"))
    }
}

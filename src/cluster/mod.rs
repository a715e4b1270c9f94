//! Cluster Setup
//!
//! Creates a cluster on an unjoined node and/or adds a node to an existing
//! cluster through ZAPI, waiting for the operation to settle.

pub mod progress;

pub use progress::*;

use crate::domain::ports::{ZapiConnectionRef, ZapiRequest};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// ZAPI error code for a node that already belongs to a cluster
pub const NODE_IN_USE_CODE: &str = "36503";

// =============================================================================
// Configuration
// =============================================================================

/// What to set up and how to wait for it
#[derive(Debug, Clone)]
pub struct ClusterSetupConfig {
    /// Create a cluster with this name
    pub cluster_name: Option<String>,
    /// Join the cluster reachable at this address
    pub cluster_ip_address: Option<String>,
    /// Delay between progress polls
    pub poll_interval: Duration,
    /// Give up after this many progress polls
    pub max_polls: u32,
}

impl Default for ClusterSetupConfig {
    fn default() -> Self {
        Self {
            cluster_name: None,
            cluster_ip_address: None,
            poll_interval: Duration::from_secs(10),
            max_polls: 90,
        }
    }
}

/// Result of a setup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterOutcome {
    pub changed: bool,
}

// =============================================================================
// Cluster Setup
// =============================================================================

/// Drives cluster create and node join over a ZAPI connection
pub struct ClusterSetup {
    connection: ZapiConnectionRef,
    config: ClusterSetupConfig,
}

impl ClusterSetup {
    pub fn new(connection: ZapiConnectionRef, config: ClusterSetupConfig) -> Self {
        Self { connection, config }
    }

    /// Create the cluster if a name is configured and join it if an address
    /// is configured
    pub async fn apply(&self) -> Result<ClusterOutcome> {
        let mut created = false;
        let mut joined = false;

        if let Some(ref name) = self.config.cluster_name {
            created = self.create_cluster(name).await?;
            if created {
                self.wait_for_create(name).await?;
            }
        }

        if let Some(ref ip_address) = self.config.cluster_ip_address {
            joined = self.cluster_join(ip_address).await?;
            if joined {
                joined = self.wait_for_join(ip_address).await?;
            }
        }

        Ok(ClusterOutcome {
            changed: created || joined,
        })
    }

    /// Issue `cluster-create`; `false` when the node is already in use
    pub async fn create_cluster(&self, cluster_name: &str) -> Result<bool> {
        info!("Creating cluster {}", cluster_name);

        let request = ZapiRequest::with_args("cluster-create", json!({"cluster-name": cluster_name}));
        match self.connection.invoke(&request).await {
            Ok(_) => Ok(true),
            Err(e) if e.code == NODE_IN_USE_CODE => {
                info!("Node already in use, cluster {} not created", cluster_name);
                Ok(false)
            }
            Err(e) => Err(Error::cluster_create(cluster_name, &e)),
        }
    }

    /// Issue `cluster-add-node` for the cluster at `ip_address`
    pub async fn cluster_join(&self, ip_address: &str) -> Result<bool> {
        info!("Adding node to cluster at {}", ip_address);

        let request = ZapiRequest::with_args(
            "cluster-add-node",
            json!({"cluster-ips": {"ip-address": ip_address}}),
        );
        self.connection
            .invoke(&request)
            .await
            .map_err(|e| Error::cluster_join(ip_address, &e))?;

        Ok(true)
    }

    /// Poll cluster creation until it completes, succeeds or fails
    pub async fn wait_for_create(&self, cluster_name: &str) -> Result<()> {
        let request = ZapiRequest::new("cluster-create-join-progress-get");

        for poll in 0..self.config.max_polls {
            if poll > 0 {
                tokio::time::sleep(self.config.poll_interval).await;
            }

            let response = self
                .connection
                .invoke(&request)
                .await
                .map_err(|e| Error::cluster_create(cluster_name, &e))?;
            let progress = CreateJoinProgress::from_response(&response).ok_or_else(|| {
                Error::ClusterCreate {
                    cluster_name: cluster_name.to_string(),
                    reason: "response carries no cluster-create-join-progress-info".into(),
                }
            })?;
            debug!("Create progress for {}: {:?}", cluster_name, progress);

            if progress.is_settled() {
                if progress.succeeded() {
                    info!("Cluster {} created", cluster_name);
                    return Ok(());
                }
                return Err(Error::ClusterCreateFailed {
                    cluster_name: cluster_name.to_string(),
                    status_message: progress.current_status_message.unwrap_or_default(),
                });
            }
        }

        Err(Error::ProgressTimeout {
            operation: format!("creation of cluster {}", cluster_name),
            polls: self.config.max_polls,
        })
    }

    /// Poll node addition until it leaves the running states.
    ///
    /// `false` when the node turned out to be in a cluster already.
    pub async fn wait_for_join(&self, ip_address: &str) -> Result<bool> {
        let request = ZapiRequest::new("cluster-add-node-status-get-iter");

        for poll in 0..self.config.max_polls {
            if poll > 0 {
                tokio::time::sleep(self.config.poll_interval).await;
            }

            let response = self
                .connection
                .invoke(&request)
                .await
                .map_err(|e| Error::cluster_join(ip_address, &e))?;
            let Some(status) = AddNodeStatus::from_response(&response) else {
                debug!("No node add status published yet for {}", ip_address);
                continue;
            };
            debug!("Node add status for {}: {:?}", ip_address, status);

            if status.is_running() {
                continue;
            }
            if status.succeeded() {
                info!("Node added to cluster at {}", ip_address);
                return Ok(true);
            }
            if status.already_in_cluster() {
                warn!("Node is already in a cluster, nothing to add at {}", ip_address);
                return Ok(false);
            }
            return Err(Error::ClusterJoin {
                ip_address: ip_address.to_string(),
                reason: status.failure_msg.unwrap_or_default(),
            });
        }

        Err(Error::ProgressTimeout {
            operation: format!("node add to {}", ip_address),
            polls: self.config.max_polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ZapiError;
    use crate::transport::MockZapiConnection;
    use assert_matches::assert_matches;
    use serde_json::Value;
    use std::sync::Arc;

    fn config(name: Option<&str>, ip: Option<&str>) -> ClusterSetupConfig {
        ClusterSetupConfig {
            cluster_name: name.map(str::to_string),
            cluster_ip_address: ip.map(str::to_string),
            poll_interval: Duration::ZERO,
            max_polls: 5,
        }
    }

    fn create_progress(is_complete: &str, status: &str) -> Value {
        json!({
            "attributes": {
                "cluster-create-join-progress-info": {
                    "is-complete": is_complete,
                    "status": status,
                    "current-status-message": "step 3 of 7"
                }
            }
        })
    }

    fn add_node_status(status: &str, failure_msg: &str) -> Value {
        json!({
            "attributes-list": {
                "cluster-create-add-node-status-info": {
                    "failure-msg": failure_msg,
                    "status": status
                }
            }
        })
    }

    fn setup(conn: &Arc<MockZapiConnection>, config: ClusterSetupConfig) -> ClusterSetup {
        ClusterSetup::new(conn.clone(), config)
    }

    #[tokio::test]
    async fn test_create_cluster_changes() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        conn.push_ok(create_progress("true", "whatever"));

        let outcome = setup(&conn, config(Some("abc"), None)).apply().await.unwrap();

        assert!(outcome.changed);
        assert_eq!(
            conn.invoked_apis(),
            vec!["cluster-create", "cluster-create-join-progress-get"]
        );
        assert_eq!(conn.requests()[0].args, json!({"cluster-name": "abc"}));
    }

    #[tokio::test]
    async fn test_create_waits_for_progress() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        conn.push_ok(create_progress("false", "in_progress"));
        conn.push_ok(create_progress("false", "in_progress"));
        conn.push_ok(create_progress("false", "success"));

        let outcome = setup(&conn, config(Some("abc"), None)).apply().await.unwrap();

        assert!(outcome.changed);
        assert_eq!(conn.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_create_reports_failed_status() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        conn.push_ok(create_progress("false", "failed"));

        let err = setup(&conn, config(Some("abc"), None)).apply().await.unwrap_err();

        assert_matches!(err, Error::ClusterCreateFailed { ref status_message, .. } if status_message == "step 3 of 7");
        assert_eq!(err.to_string(), "Failed to create cluster abc: step 3 of 7");
    }

    #[tokio::test]
    async fn test_create_node_in_use_is_no_change() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_err(ZapiError::new(NODE_IN_USE_CODE, "node is already in use"));

        let outcome = setup(&conn, config(Some("abc"), None)).apply().await.unwrap();

        assert!(!outcome.changed);
        assert_eq!(conn.invoked_apis(), vec!["cluster-create"]);
    }

    #[tokio::test]
    async fn test_create_error() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_err(ZapiError::new("TEST", "This exception is from the unit test"));

        let err = setup(&conn, config(Some("abc"), None))
            .create_cluster("abc")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Error creating cluster"));
    }

    #[tokio::test]
    async fn test_create_times_out() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        for _ in 0..5 {
            conn.push_ok(create_progress("false", "in_progress"));
        }

        let err = setup(&conn, config(Some("abc"), None)).apply().await.unwrap_err();
        assert_matches!(err, Error::ProgressTimeout { polls: 5, .. });
    }

    #[tokio::test]
    async fn test_cluster_join() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        conn.push_ok(add_node_status("in_progress", ""));
        conn.push_ok(add_node_status("success", ""));

        let outcome = setup(&conn, config(None, Some("10.10.10.10")))
            .apply()
            .await
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(
            conn.invoked_apis(),
            vec![
                "cluster-add-node",
                "cluster-add-node-status-get-iter",
                "cluster-add-node-status-get-iter"
            ]
        );
        assert_eq!(
            conn.requests()[0].args,
            json!({"cluster-ips": {"ip-address": "10.10.10.10"}})
        );
    }

    #[tokio::test]
    async fn test_cluster_join_error() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_err(ZapiError::new("TEST", "This exception is from the unit test"));

        let err = setup(&conn, config(None, Some("10.10.10.10")))
            .cluster_join("10.10.10.10")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Error adding node with ip"));
    }

    #[tokio::test]
    async fn test_cluster_join_failure_status() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        conn.push_ok(add_node_status("failure", "Cluster network unreachable"));

        let err = setup(&conn, config(None, Some("10.10.10.10")))
            .apply()
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error adding node with ip 10.10.10.10: Cluster network unreachable"
        );
    }

    #[tokio::test]
    async fn test_cluster_join_already_member() {
        let conn = Arc::new(MockZapiConnection::new());
        conn.push_ok(json!({}));
        conn.push_ok(add_node_status("failure", "Node is already in a cluster."));

        let outcome = setup(&conn, config(None, Some("10.10.10.10")))
            .apply()
            .await
            .unwrap();

        assert!(!outcome.changed);
    }

    #[tokio::test]
    async fn test_nothing_configured() {
        let conn = Arc::new(MockZapiConnection::new());

        let outcome = setup(&conn, config(None, None)).apply().await.unwrap();

        assert!(!outcome.changed);
        assert!(conn.requests().is_empty());
    }
}

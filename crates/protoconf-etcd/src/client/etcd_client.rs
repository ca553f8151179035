//! etcd client wrapper and connection management.

use etcd_client::{Client, ConnectOptions};
use tracing::{debug, info, instrument};

use super::etcd_config::EtcdConfig;
use crate::kv::{ConfigStore, KeyNamespace};
use crate::watch::ConfigWatcher;
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// etcd client wrapper with connection management.
///
/// Owns the connected client handle and the key namespace derived from the
/// configured envkey; hands out [`ConfigStore`] and [`ConfigWatcher`]
/// instances that share the connection.
#[derive(Clone)]
pub struct EtcdClient {
    client: Client,
    config: EtcdConfig,
    namespace: KeyNamespace,
}

impl EtcdClient {
    /// Create a new etcd client and connect.
    ///
    /// Authentication uses the configured `username:password` credential
    /// when present. Connection and authentication failures are returned to
    /// the caller rather than leaving a half-built client behind.
    #[instrument(skip(config))]
    pub async fn connect(config: EtcdConfig) -> Result<Self> {
        config.validate().map_err(Error::invalid_config)?;

        info!(
            target: TRACING_TARGET_CLIENT,
            endpoints = ?config.endpoints(),
            envkey = %config.envkey(),
            "Connecting to etcd cluster"
        );

        let mut options = ConnectOptions::new();
        if let Some((user, password)) = config.credentials() {
            options = options.with_user(user, password);
        }
        if let Some(timeout) = config.connect_timeout() {
            options = options.with_connect_timeout(timeout);
        }
        if let Some(timeout) = config.request_timeout() {
            options = options.with_timeout(timeout);
        }

        let client = Client::connect(config.endpoints(), Some(options)).await?;
        let namespace = KeyNamespace::new(config.envkey());

        info!(
            target: TRACING_TARGET_CLIENT,
            envkey = %namespace.envkey(),
            "Successfully connected to etcd"
        );

        Ok(Self {
            client,
            config,
            namespace,
        })
    }

    /// Get the underlying etcd client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the configuration
    pub fn config(&self) -> &EtcdConfig {
        &self.config
    }

    /// Get the key namespace derived from the configured envkey
    pub fn namespace(&self) -> &KeyNamespace {
        &self.namespace
    }

    /// Create a configuration store sharing this connection
    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(self.client.clone(), self.namespace.clone())
    }

    /// Create a watch factory sharing this connection
    pub fn watcher(&self) -> ConfigWatcher {
        ConfigWatcher::new(self.client.clone(), self.namespace.clone())
    }

    /// Probe the cluster and return status information.
    #[instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn status(&self) -> Result<ClusterStatus> {
        let mut maintenance = self.client.maintenance_client();
        let status = maintenance.status().await?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            server_version = %status.version(),
            db_size_bytes = status.db_size(),
            "Cluster status probe successful"
        );

        Ok(ClusterStatus {
            server_version: status.version().to_string(),
            db_size_bytes: status.db_size(),
            leader_id: status.leader(),
            raft_term: status.raft_term(),
        })
    }
}

/// Cluster status information
#[derive(Debug, Clone)]
pub struct ClusterStatus {
    pub server_version: String,
    pub db_size_bytes: i64,
    pub leader_id: u64,
    pub raft_term: u64,
}

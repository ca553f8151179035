//! etcd connection configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for etcd connections.
///
/// The environment variable names match what the deployment tooling exports:
/// `etcd_endpoints`, `etcd_user` (as `username:password`), and `etcd_envkey`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct EtcdConfig {
    /// etcd endpoint URL (comma-separated for clustering)
    #[cfg_attr(
        feature = "config",
        arg(long = "etcd-endpoints", env = "etcd_endpoints")
    )]
    pub etcd_endpoints: String,

    /// Environment namespace segment prepended to every application key
    #[cfg_attr(feature = "config", arg(long = "etcd-envkey", env = "etcd_envkey"))]
    pub etcd_envkey: String,

    /// Combined `username:password` credential; omit when auth is disabled
    #[cfg_attr(feature = "config", arg(long = "etcd-user", env = "etcd_user"))]
    pub etcd_user: Option<String>,

    /// Connection timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "etcd-connect-timeout", env = "etcd_connect_timeout_secs")
    )]
    pub etcd_connect_timeout: Option<u64>,

    /// Request timeout in seconds applied to every call (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "etcd-request-timeout", env = "etcd_request_timeout_secs")
    )]
    pub etcd_request_timeout: Option<u64>,
}

impl EtcdConfig {
    /// Create a new configuration with endpoint URL(s) and an envkey.
    pub fn new(endpoints: impl Into<String>, envkey: impl Into<String>) -> Self {
        Self {
            etcd_endpoints: endpoints.into(),
            etcd_envkey: envkey.into(),
            etcd_user: None,
            etcd_connect_timeout: None,
            etcd_request_timeout: None,
        }
    }

    /// Create configuration from the `etcd_endpoints`, `etcd_envkey`, and
    /// `etcd_user` environment variables.
    ///
    /// Returns an error when the endpoint list or envkey is not set; the
    /// credential variable is optional.
    pub fn from_env() -> Result<Self> {
        let endpoints = std::env::var("etcd_endpoints")
            .map_err(|_| Error::invalid_config("etcd_endpoints environment variable is not set"))?;
        let envkey = std::env::var("etcd_envkey")
            .map_err(|_| Error::invalid_config("etcd_envkey environment variable is not set"))?;

        let mut config = Self::new(endpoints, envkey);
        if let Ok(user) = std::env::var("etcd_user") {
            config.etcd_user = Some(user);
        }
        Ok(config)
    }

    /// Returns the endpoint URLs as a vector (splits comma-separated URLs).
    pub fn endpoints(&self) -> Vec<&str> {
        self.etcd_endpoints.split(',').map(str::trim).collect()
    }

    /// Returns the raw envkey segment as configured.
    #[inline]
    pub fn envkey(&self) -> &str {
        &self.etcd_envkey
    }

    /// Returns the username and password parsed from the combined
    /// `username:password` credential, if one is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.etcd_user.as_deref().and_then(|u| u.split_once(':'))
    }

    /// Returns the connection timeout as a Duration, if set.
    #[inline]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.etcd_connect_timeout.map(Duration::from_secs)
    }

    /// Returns the request timeout as a Duration, if set.
    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.etcd_request_timeout.map(Duration::from_secs)
    }

    /// Set endpoint URL(s).
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: impl Into<String>) -> Self {
        self.etcd_endpoints = endpoints.into();
        self
    }

    /// Set the combined `username:password` credential.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.etcd_user = Some(user.into());
        self
    }

    /// Set the environment namespace segment.
    #[must_use]
    pub fn with_envkey(mut self, envkey: impl Into<String>) -> Self {
        self.etcd_envkey = envkey.into();
        self
    }

    /// Set the connection timeout in seconds.
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.etcd_connect_timeout = Some(secs);
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.etcd_request_timeout = Some(secs);
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        let endpoints = self.endpoints();

        if endpoints.is_empty() {
            return Err("At least one endpoint URL must be provided".to_string());
        }

        for endpoint in endpoints {
            if endpoint.is_empty() {
                return Err("Endpoint URL cannot be empty".to_string());
            }
        }

        if self.etcd_envkey.trim_matches('/').is_empty() {
            return Err("envkey cannot be empty".to_string());
        }

        if let Some(user) = &self.etcd_user
            && !user.contains(':')
        {
            return Err("etcd_user must be in 'username:password' form".to_string());
        }

        Ok(())
    }
}

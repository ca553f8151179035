//! Environment-scoped key-value operations.
//!
//! This module provides the read/write surface over etcd:
//! - [`ConfigStore`]: transactional batch reads, single-key reads/writes,
//!   and prefix scans
//! - [`KeyNamespace`]: the `/<envkey>/<app>/<key>` composition rule shared
//!   by all operations
//!
//! # Example
//!
//! ```ignore
//! let store = client.config_store();
//!
//! // Fetch a batch of keys for one application
//! let values = store.get_values("svc1", &["timeout", "retries"]).await?;
//!
//! // Every requested key is present; unwritten keys map to None
//! assert!(values.contains_key("retries"));
//! ```

mod config_store;
mod key_namespace;

pub use config_store::ConfigStore;
pub use key_namespace::KeyNamespace;

//! Prelude module for protoconf-etcd.
//!
//! This module re-exports the most commonly used types and traits from
//! protoconf-etcd, making it easy to import everything you need with a
//! single `use` statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use protoconf_etcd::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let config = EtcdConfig::new("http://127.0.0.1:2379", "prod");
//! let client = EtcdClient::connect(config).await?;
//! # Ok(())
//! # }
//! ```

// Client types
pub use crate::client::{ClusterStatus, EtcdClient, EtcdConfig};
// Key-value types
pub use crate::kv::{ConfigStore, KeyNamespace};
// Watch types
pub use crate::watch::{ConfigSink, ConfigWatcher, WatchHandle};
// Error types
pub use crate::{Error, Result};

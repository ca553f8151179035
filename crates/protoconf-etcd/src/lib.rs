#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for etcd client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "protoconf_etcd::client";

/// Tracing target for key-value read and write operations.
///
/// Use this target for logging batch gets, single-key gets/puts, prefix scans, and KV-related errors.
pub const TRACING_TARGET_KV: &str = "protoconf_etcd::kv";

/// Tracing target for watch loop operations.
///
/// Use this target for logging watch establishment, change delivery, cancellation, and watch errors.
pub const TRACING_TARGET_WATCH: &str = "protoconf_etcd::watch";

mod client;
mod error;
pub mod kv;
pub mod prelude;
pub mod watch;

// Re-export etcd-client types needed by consumers
pub use client::{ClusterStatus, EtcdClient, EtcdConfig};
pub use error::{Error, Result};
pub use etcd_client;

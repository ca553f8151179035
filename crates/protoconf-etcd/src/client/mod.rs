//! etcd client connection management and configuration.

mod etcd_client;
mod etcd_config;

pub use etcd_client::{ClusterStatus, EtcdClient};
pub use etcd_config::EtcdConfig;

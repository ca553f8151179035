//! Transactional and single-key configuration reads and writes.

use std::collections::HashMap;

use etcd_client::{Client, GetOptions, Txn, TxnOp, TxnOpResponse};
use tracing::{debug, instrument};

use super::key_namespace::KeyNamespace;
use crate::{Result, TRACING_TARGET_KV};

/// Environment-scoped configuration reader and writer.
///
/// Batch reads compose keys as `/<envkey>/<app>/<key>`; the single-key and
/// prefix operations take literal store paths with no namespace injection.
/// Transport failures are returned as errors, never as partial results, so
/// callers can distinguish "key not found" from "store unreachable".
#[derive(Clone)]
pub struct ConfigStore {
    client: Client,
    namespace: KeyNamespace,
}

impl ConfigStore {
    pub(crate) fn new(client: Client, namespace: KeyNamespace) -> Self {
        Self { client, namespace }
    }

    /// The namespace applied to batch reads.
    pub fn namespace(&self) -> &KeyNamespace {
        &self.namespace
    }

    /// Fetch a batch of application keys in one atomic transaction.
    ///
    /// The returned map contains exactly one entry per requested key, with
    /// `None` for keys not present in the store; returned key names have
    /// the namespace prefix stripped back to the bare key.
    #[instrument(skip(self, keys), target = TRACING_TARGET_KV)]
    pub async fn get_values(
        &self,
        app_name: &str,
        keys: &[&str],
    ) -> Result<HashMap<String, Option<String>>> {
        let mut result = empty_result(keys);
        if keys.is_empty() {
            return Ok(result);
        }

        let prefix = self.namespace.app_prefix(app_name);
        let ops: Vec<TxnOp> = keys
            .iter()
            .map(|key| TxnOp::get(format!("{prefix}{key}"), None))
            .collect();

        let mut kv = self.client.kv_client();
        let response = kv.txn(Txn::new().and_then(ops)).await?;

        let mut found = 0usize;
        for op_response in response.op_responses() {
            let TxnOpResponse::Get(get_response) = op_response else {
                continue;
            };
            // Zero kvs means the key was never written; the None entry stays.
            let Some(kv_pair) = get_response.kvs().first() else {
                continue;
            };
            let full_key = kv_pair.key_str()?;
            let value = kv_pair.value_str()?;
            if let Some(bare_key) = full_key.strip_prefix(prefix.as_str())
                && let Some(slot) = result.get_mut(bare_key)
            {
                *slot = Some(value.to_string());
                found += 1;
            }
        }

        debug!(
            target: TRACING_TARGET_KV,
            app_name = %app_name,
            requested = keys.len(),
            found = found,
            "Batch get completed"
        );
        Ok(result)
    }

    /// Fetch a single key by its literal store path.
    #[instrument(skip(self), target = TRACING_TARGET_KV)]
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut kv = self.client.kv_client();
        let response = kv.get(key, None).await?;

        match response.kvs().first() {
            Some(kv_pair) => {
                let value = kv_pair.value_str()?.to_string();
                debug!(
                    target: TRACING_TARGET_KV,
                    key = %key,
                    size_bytes = value.len(),
                    "Retrieved value"
                );
                Ok(Some(value))
            }
            None => {
                debug!(
                    target: TRACING_TARGET_KV,
                    key = %key,
                    "Key not found"
                );
                Ok(None)
            }
        }
    }

    /// Write a single key by its literal store path, no batching.
    #[instrument(skip(self, value), target = TRACING_TARGET_KV)]
    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let mut kv = self.client.kv_client();
        kv.put(key, value, None).await?;

        debug!(
            target: TRACING_TARGET_KV,
            key = %key,
            size_bytes = value.len(),
            "Put value"
        );
        Ok(())
    }

    /// Fetch all keys sharing a literal prefix.
    ///
    /// Map keys are the full, unstripped store paths. An empty map means no
    /// keys matched the prefix.
    #[instrument(skip(self), target = TRACING_TARGET_KV)]
    pub async fn get_value_with_prefix(&self, prefix: &str) -> Result<HashMap<String, String>> {
        let mut kv = self.client.kv_client();
        let response = kv.get(prefix, Some(GetOptions::new().with_prefix())).await?;

        let mut key_values = HashMap::with_capacity(response.kvs().len());
        for kv_pair in response.kvs() {
            key_values.insert(
                kv_pair.key_str()?.to_string(),
                kv_pair.value_str()?.to_string(),
            );
        }

        debug!(
            target: TRACING_TARGET_KV,
            prefix = %prefix,
            count = key_values.len(),
            "Prefix scan completed"
        );
        Ok(key_values)
    }
}

/// Seed the batch-get result with one `None` entry per requested key, so
/// the returned key set always equals the request exactly.
fn empty_result(keys: &[&str]) -> HashMap<String, Option<String>> {
    keys.iter().map(|key| (key.to_string(), None)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{EtcdClient, EtcdConfig};

    #[test]
    fn test_empty_result_covers_every_requested_key() {
        let result = empty_result(&["timeout", "retries", "feature_flag"]);

        assert_eq!(result.len(), 3);
        assert_eq!(result["timeout"], None);
        assert_eq!(result["retries"], None);
        assert_eq!(result["feature_flag"], None);
    }

    #[test]
    fn test_empty_result_for_empty_request() {
        assert!(empty_result(&[]).is_empty());
    }

    async fn test_store() -> ConfigStore {
        let config = EtcdConfig::new("http://127.0.0.1:2379", "test");
        EtcdClient::connect(config)
            .await
            .expect("etcd must be running for ignored tests")
            .config_store()
    }

    // The remaining tests require a running etcd cluster on 127.0.0.1:2379
    // and are ignored by default.

    #[tokio::test]
    #[ignore]
    async fn test_set_then_get_round_trip() {
        let store = test_store().await;

        store.set_value("/test/svc1/timeout", "30").await.unwrap();
        let value = store.get_value("/test/svc1/timeout").await.unwrap();
        assert_eq!(value.as_deref(), Some("30"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_values_shape() {
        let store = test_store().await;

        store.set_value("/test/svc1/timeout", "30").await.unwrap();
        let values = store
            .get_values("svc1", &["timeout", "never_written"])
            .await
            .unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values["timeout"].as_deref(), Some("30"));
        assert_eq!(values["never_written"], None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_prefix_scan_returns_full_paths() {
        let store = test_store().await;

        store.set_value("/test/svc1/a", "1").await.unwrap();
        store.set_value("/test/svc1/b", "2").await.unwrap();
        let values = store.get_value_with_prefix("/test/svc1/").await.unwrap();

        assert!(values.len() >= 2);
        assert_eq!(values.get("/test/svc1/a").map(String::as_str), Some("1"));
        assert!(values.keys().all(|key| key.starts_with("/test/svc1/")));
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_missing_key_is_none_not_error() {
        let store = test_store().await;

        let value = store.get_value("/test/never/written").await.unwrap();
        assert_eq!(value, None);
    }
}

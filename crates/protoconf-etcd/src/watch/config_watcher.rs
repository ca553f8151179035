//! Prefix watch loop delivering batched key changes to a sink.

use std::collections::HashMap;

use etcd_client::{Client, Event, EventType, WatchOptions, WatchStream, Watcher};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use super::sink::ConfigSink;
use crate::kv::KeyNamespace;
use crate::{Result, TRACING_TARGET_WATCH};

/// Factory for background watch tasks over an application's key prefix.
#[derive(Clone)]
pub struct ConfigWatcher {
    client: Client,
    namespace: KeyNamespace,
}

impl ConfigWatcher {
    pub(crate) fn new(client: Client, namespace: KeyNamespace) -> Self {
        Self { client, namespace }
    }

    /// Open a prefix watch for the sink's application and spawn the
    /// delivery loop.
    ///
    /// Errors establishing the watch are returned to the caller. Once the
    /// loop is running, any stream error terminates the task after a log
    /// event; there is no retry. The returned handle owns the task
    /// lifecycle and must be kept to cancel the watch.
    #[instrument(skip(self, sink), target = TRACING_TARGET_WATCH)]
    pub async fn watch_keys<S: ConfigSink>(&self, sink: S) -> Result<WatchHandle> {
        let prefix = self.namespace.app_prefix(sink.application_name());

        let mut watch_client = self.client.watch_client();
        let (watcher, stream) = watch_client
            .watch(prefix.as_str(), Some(WatchOptions::new().with_prefix()))
            .await?;

        debug!(
            target: TRACING_TARGET_WATCH,
            prefix = %prefix,
            watch_id = watcher.watch_id(),
            "Watch established"
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(watch_loop(watcher, stream, prefix, sink, cancel.clone()));

        Ok(WatchHandle { cancel, task })
    }
}

/// Caller-owned handle to a running watch task.
///
/// Dropping the handle leaves the task running; use [`cancel`](Self::cancel)
/// or [`shutdown`](Self::shutdown) for a deterministic stop.
#[derive(Debug)]
pub struct WatchHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Signal the watch loop to stop without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the watch task has terminated.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the watch loop to stop and wait for the task to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    /// Forcibly abort the watch task without cancelling the server-side
    /// watcher.
    pub fn abort(&self) {
        self.task.abort();
    }
}

async fn watch_loop<S: ConfigSink>(
    mut watcher: Watcher,
    mut stream: WatchStream,
    prefix: String,
    sink: S,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = watcher.cancel().await {
                    warn!(
                        target: TRACING_TARGET_WATCH,
                        prefix = %prefix,
                        error = %e,
                        "Failed to cancel server-side watcher"
                    );
                }
                debug!(
                    target: TRACING_TARGET_WATCH,
                    prefix = %prefix,
                    "Watch cancelled by caller"
                );
                return;
            }
            message = stream.message() => match message {
                Ok(Some(response)) => {
                    if response.canceled() {
                        warn!(
                            target: TRACING_TARGET_WATCH,
                            prefix = %prefix,
                            reason = %response.cancel_reason(),
                            "Watch cancelled by server, live updates stopped"
                        );
                        return;
                    }

                    let changes = collect_changes(&prefix, response.events());
                    for (key, value) in &changes {
                        sink.add_key_change(key, value);
                    }
                    if !changes.is_empty() {
                        debug!(
                            target: TRACING_TARGET_WATCH,
                            prefix = %prefix,
                            count = changes.len(),
                            "Delivered key changes"
                        );
                    }
                }
                Ok(None) => {
                    warn!(
                        target: TRACING_TARGET_WATCH,
                        prefix = %prefix,
                        "Watch stream closed by server, live updates stopped"
                    );
                    return;
                }
                Err(e) => {
                    error!(
                        target: TRACING_TARGET_WATCH,
                        prefix = %prefix,
                        error = %e,
                        "Watch stream error, live updates stopped"
                    );
                    watcher.cancel().await.ok();
                    return;
                }
            }
        }
    }
}

/// Collect the PUT events of one notification batch into a bare-key map.
///
/// Same-key updates within a batch deduplicate with last-write-wins. DELETE
/// events are not recorded and never reach the sink.
fn collect_changes(prefix: &str, events: &[Event]) -> HashMap<String, String> {
    let mut changes = HashMap::new();
    for event in events {
        if event.event_type() != EventType::Put {
            continue;
        }
        let Some(kv_pair) = event.kv() else {
            continue;
        };
        let (Ok(full_key), Ok(value)) = (kv_pair.key_str(), kv_pair.value_str()) else {
            warn!(
                target: TRACING_TARGET_WATCH,
                prefix = %prefix,
                "Skipping event with non-UTF-8 key or value"
            );
            continue;
        };
        record_change(&mut changes, prefix, full_key, value);
    }
    changes
}

fn record_change(changes: &mut HashMap<String, String>, prefix: &str, full_key: &str, value: &str) {
    if let Some(bare_key) = full_key.strip_prefix(prefix) {
        changes.insert(bare_key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct MockSink {
        app: &'static str,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockSink {
        fn new(app: &'static str) -> Self {
            Self {
                app,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ConfigSink for MockSink {
        fn application_name(&self) -> &str {
            self.app
        }

        fn add_key_change(&self, key: &str, value: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
        }
    }

    #[test]
    fn test_record_change_strips_prefix() {
        let mut changes = HashMap::new();
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/timeout", "30");

        assert_eq!(changes.get("timeout").map(String::as_str), Some("30"));
    }

    #[test]
    fn test_record_change_ignores_foreign_keys() {
        let mut changes = HashMap::new();
        record_change(&mut changes, "/prod/svc1/", "/prod/svc2/timeout", "30");

        assert!(changes.is_empty());
    }

    #[test]
    fn test_same_key_dedupe_last_write_wins() {
        let mut changes = HashMap::new();
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/timeout", "10");
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/timeout", "30");
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/retries", "5");

        assert_eq!(changes.len(), 2);
        assert_eq!(changes.get("timeout").map(String::as_str), Some("30"));
    }

    #[test]
    fn test_batch_delivery_is_one_call_per_distinct_key() {
        let sink = MockSink::new("svc1");
        let mut changes = HashMap::new();
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/timeout", "10");
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/timeout", "30");
        record_change(&mut changes, "/prod/svc1/", "/prod/svc1/retries", "5");

        for (key, value) in &changes {
            sink.add_key_change(key, value);
        }

        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&("timeout".to_string(), "30".to_string())));
        assert!(calls.contains(&("retries".to_string(), "5".to_string())));
    }

    // The remaining tests require a running etcd cluster on 127.0.0.1:2379
    // and are ignored by default.

    #[tokio::test]
    #[ignore]
    async fn test_put_is_delivered_and_delete_is_not() {
        use std::sync::Arc;
        use std::time::Duration;

        use crate::client::{EtcdClient, EtcdConfig};

        let config = EtcdConfig::new("http://127.0.0.1:2379", "test");
        let client = EtcdClient::connect(config).await.unwrap();
        let store = client.config_store();

        let sink = Arc::new(MockSink::new("svc1"));
        let handle = client.watcher().watch_keys(sink.clone()).await.unwrap();

        store.set_value("/test/svc1/timeout", "30").await.unwrap();
        let mut kv = client.inner().kv_client();
        kv.delete("/test/svc1/timeout", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let calls = sink.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("timeout".to_string(), "30".to_string())]);

        handle.shutdown().await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_shutdown_terminates_watch_task() {
        use crate::client::{EtcdClient, EtcdConfig};

        let config = EtcdConfig::new("http://127.0.0.1:2379", "test");
        let client = EtcdClient::connect(config).await.unwrap();

        let handle = client
            .watcher()
            .watch_keys(MockSink::new("svc1"))
            .await
            .unwrap();
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }
}

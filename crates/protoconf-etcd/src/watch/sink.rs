//! Capability trait for receiving configuration key changes.

use std::sync::Arc;

/// Capability supplied by the configuration owner to receive key changes.
///
/// The watch loop calls [`application_name`](ConfigSink::application_name)
/// once to derive the watch prefix, then
/// [`add_key_change`](ConfigSink::add_key_change) once per distinct changed
/// key per notification batch, with the namespace prefix already stripped.
pub trait ConfigSink: Send + Sync + 'static {
    /// Name of the application whose keys should be watched.
    fn application_name(&self) -> &str;

    /// Receive the new value for a bare (prefix-stripped) key.
    fn add_key_change(&self, key: &str, value: &str);
}

impl<T: ConfigSink + ?Sized> ConfigSink for Arc<T> {
    fn application_name(&self) -> &str {
        (**self).application_name()
    }

    fn add_key_change(&self, key: &str, value: &str) {
        (**self).add_key_change(key, value)
    }
}

//! Background watch loop streaming key changes into a caller-supplied sink.
//!
//! [`ConfigWatcher`] opens a prefix watch over one application's keys and
//! spawns a delivery task; the caller keeps the returned [`WatchHandle`] to
//! control the task's lifecycle. Changes arrive at the [`ConfigSink`]
//! capability, one call per distinct key per notification batch.

mod config_watcher;
mod sink;

pub use config_watcher::{ConfigWatcher, WatchHandle};
pub use sink::ConfigSink;

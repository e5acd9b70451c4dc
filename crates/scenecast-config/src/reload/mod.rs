//! Live config reload.
//!
//! A `notify` watcher on the config file's directory feeds a debounce
//! loop; each settled change re-reads the file and publishes the new
//! config on a [`tokio::sync::watch`] channel.

mod reloader;
mod watcher;


pub use reloader::ConfigReloader;
pub use watcher::FileWatcher;

//! Re-reads the config file whenever it changes on disk.

use std::path::PathBuf;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::schema::ScenecastConfig;
use crate::toml_loader;

use super::watcher::FileWatcher;

/// Publishes fresh configs as the file at `path` changes.
pub struct ConfigReloader {
    path: PathBuf,
}

impl ConfigReloader {
    /// Load the initial config and start watching in a background task.
    ///
    /// A missing or unparsable file yields defaults. Later reloads that fail
    /// to parse are logged and skipped; the last good config stays current.
    /// Validation problems only warn, as on the initial load.
    pub fn start(path: PathBuf) -> (ScenecastConfig, watch::Receiver<ScenecastConfig>) {
        let initial = match toml_loader::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to load config: {e}, using defaults");
                ScenecastConfig::default()
            }
        };

        let (tx, rx) = watch::channel(initial.clone());
        let reloader = Self { path };
        tokio::spawn(async move { reloader.run(tx).await });

        (initial, rx)
    }

    async fn run(self, tx: watch::Sender<ScenecastConfig>) {
        let watcher = FileWatcher::new(self.path.clone());
        let result = watcher
            .run(|| {
                info!("reloading config from {}", watcher.path().display());
                match self.reload() {
                    Ok(config) => {
                        if tx.send(config).is_err() {
                            info!("all config receivers dropped, stopping reloader");
                            return false;
                        }
                    }
                    Err(e) => warn!("config reload failed: {e}"),
                }
                true
            })
            .await;

        if let Err(e) = result {
            error!("config watcher error: {e}");
        }
    }

    fn reload(&self) -> Result<ScenecastConfig, scenecast_common::ConfigError> {
        toml_loader::load_from_path(&self.path)
    }
}

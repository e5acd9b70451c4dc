//! Debounced file change notifications.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use scenecast_common::ConfigError;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Editors often save with write + rename; coalesce within this window.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches a single file and reports settled changes.
pub struct FileWatcher {
    path: PathBuf,
}

impl FileWatcher {
    /// Create a watcher for `path`. The file does not need to exist yet.
    pub fn new(path: PathBuf) -> Self {
        if !path.exists() {
            warn!(
                "{} does not exist yet, will watch for creation",
                path.display()
            );
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run until `on_change` returns `false` or the OS watcher goes away.
    pub async fn run<F>(&self, mut on_change: F) -> Result<(), ConfigError>
    where
        F: FnMut() -> bool,
    {
        let (raw_tx, mut raw_rx) = mpsc::channel::<()>(16);
        let _watcher = self.spawn_os_watcher(raw_tx)?;

        while raw_rx.recv().await.is_some() {
            let settle = tokio::time::sleep(DEBOUNCE);
            tokio::pin!(settle);

            loop {
                tokio::select! {
                    _ = &mut settle => break,
                    more = raw_rx.recv() => {
                        if more.is_none() {
                            return Ok(());
                        }
                    }
                }
            }

            debug!("{} settled after change", self.path.display());
            if !on_change() {
                break;
            }
        }

        Ok(())
    }

    fn spawn_os_watcher(&self, raw_tx: mpsc::Sender<()>) -> Result<RecommendedWatcher, ConfigError> {
        let file_name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.path.clone());

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if touches_file(&event, &file_name) {
                        let _ = raw_tx.try_send(());
                    }
                }
                Err(e) => error!("file watcher error: {e}"),
            },
            notify::Config::default(),
        )
        .map_err(|e| ConfigError::WatchError(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("failed to watch {}: {e}", dir.display())))?;

        Ok(watcher)
    }
}

fn touches_file(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == file_name.as_os_str()))
}

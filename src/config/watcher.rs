//! Declaration file watcher for hot reload.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::manager::ConfigurationManager;

/// Outcome of a reload triggered by a file change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    Reloaded { actions: usize },
    Failed(String),
}

/// A watcher that reloads the manager when declaration files change.
pub struct ConfigWatcher {
    paths: Vec<PathBuf>,
    manager: Arc<ConfigurationManager>,
    event_tx: mpsc::UnboundedSender<ReloadEvent>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for reload outcomes.
    pub fn new(
        paths: Vec<PathBuf>,
        manager: Arc<ConfigurationManager>,
    ) -> (Self, mpsc::UnboundedReceiver<ReloadEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (
            Self {
                paths,
                manager,
                event_tx,
            },
            event_rx,
        )
    }

    /// Start watching in a background thread. The returned watcher must be
    /// kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.event_tx.clone();
        let manager = self.manager.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    match manager.reload_if_needed() {
                        Ok(true) => {
                            let actions = manager.snapshot().action_count();
                            let _ = tx.send(ReloadEvent::Reloaded { actions });
                        }
                        Ok(false) => {
                            tracing::debug!(paths = ?event.paths, "Change event without content change");
                        }
                        Err(e) => {
                            let _ = tx.send(ReloadEvent::Failed(e.to_string()));
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for path in &self.paths {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(paths = ?self.paths, "Declaration watcher started");
        Ok(watcher)
    }
}

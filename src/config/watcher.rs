//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Turn file system events into validated configurations
//! - Coalesce event bursts so a reload reads the finished file
//!
//! # Design Decisions
//! - The notify callback only signals; reading and parsing happen on a tokio task
//! - An empty or whitespace-only file is a write in progress and is never published
//! - Rejected reloads are counted only while metrics are enabled in the last
//!   accepted configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::DigestServiceConfig;
use crate::observability::metrics;

/// Quiet period after the last event before the file is read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DigestServiceConfig>,
    settle_delay: Duration,
    metrics_enabled: bool,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates,
    /// suitable for [`GeneratorHandle::follow`](crate::digest::GeneratorHandle::follow).
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DigestServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
                settle_delay: DEFAULT_SETTLE_DELAY,
                metrics_enabled: true,
            },
            update_rx,
        )
    }

    /// Override the quiet period used to coalesce event bursts.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Metrics setting of the configuration currently in effect.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Start watching the file.
    ///
    /// Must be called from within a tokio runtime. Reloading stops once the
    /// returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(
            path = ?self.path,
            settle_ms = self.settle_delay.as_millis() as u64,
            "Config watcher started"
        );
        tokio::spawn(self.reload_on_change(event_rx));
        Ok(watcher)
    }

    async fn reload_on_change(mut self, mut events: mpsc::UnboundedReceiver<()>) {
        while events.recv().await.is_some() {
            // wait until the writer has gone quiet
            while let Ok(Some(())) = tokio::time::timeout(self.settle_delay, events.recv()).await {}

            self.reload().await;
            if self.update_tx.is_closed() {
                break;
            }
        }
        tracing::debug!(path = ?self.path, "Config watcher stopped");
    }

    async fn reload(&mut self) {
        tracing::info!(path = ?self.path, "Config file change detected, reloading");

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => return self.reject(ConfigError::Io(e)),
        };
        if content.trim().is_empty() {
            tracing::debug!(path = ?self.path, "Config file is empty, skipping reload");
            return;
        }

        match parse_config(&content) {
            Ok(config) => {
                self.metrics_enabled = config.observability.metrics_enabled;
                let _ = self.update_tx.send(config);
            }
            Err(e) => self.reject(e),
        }
    }

    fn reject(&self, error: ConfigError) {
        if self.metrics_enabled {
            metrics::record_reload(false);
        }
        tracing::error!(
            path = ?self.path,
            error = %error,
            "Failed to reload config, keeping current configuration"
        );
    }
}

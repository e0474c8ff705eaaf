//! Hot-swappable generator handle.
//!
//! # Responsibilities
//! - Publish a fully built generator before any call can observe it
//! - Replace it atomically when a new configuration is accepted
//!
//! # Design Decisions
//! - Generators are never mutated; a reload builds a new one
//! - Each call works on one snapshot, so a reload mid-call is invisible to it
//! - Readers never block (`ArcSwap::load_full`)

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;

use crate::config::schema::DigestServiceConfig;
use crate::digest::error::DigestResult;
use crate::digest::generator::{Digest, DigestGenerator, FingerprintGenerator};
use crate::observability::metrics;
use crate::request::RequestView;

/// Shared, reloadable access to the current [`FingerprintGenerator`].
#[derive(Debug)]
pub struct GeneratorHandle {
    current: ArcSwap<FingerprintGenerator>,
}

impl GeneratorHandle {
    pub fn new(generator: FingerprintGenerator) -> Self {
        Self {
            current: ArcSwap::from_pointee(generator),
        }
    }

    /// Build the initial generator from a loaded configuration.
    pub fn from_config(config: &DigestServiceConfig) -> Self {
        Self::new(build_generator(config))
    }

    /// Snapshot of the generator in effect right now.
    pub fn current(&self) -> Arc<FingerprintGenerator> {
        self.current.load_full()
    }

    /// Publish a new generator.
    pub fn replace(&self, generator: FingerprintGenerator) {
        self.current.store(Arc::new(generator));
    }

    /// Apply configurations from `updates` until the sender side is dropped.
    pub async fn follow(self: Arc<Self>, mut updates: mpsc::UnboundedReceiver<DigestServiceConfig>) {
        while let Some(config) = updates.recv().await {
            let generator = build_generator(&config);
            tracing::info!(
                excluded = ?generator.exclusions().configurable().collect::<Vec<_>>(),
                algorithm = %generator.algorithm_name(),
                "Digest configuration reloaded"
            );
            self.replace(generator);
            if config.observability.metrics_enabled {
                metrics::record_reload(true);
            }
        }
        tracing::debug!("Configuration update channel closed");
    }
}

impl DigestGenerator for GeneratorHandle {
    fn compute_digest(&self, view: &RequestView) -> DigestResult<Option<Digest>> {
        self.current.load().compute_digest(view)
    }
}

fn build_generator(config: &DigestServiceConfig) -> FingerprintGenerator {
    FingerprintGenerator::new(&config.generator).with_metrics(config.observability.metrics_enabled)
}

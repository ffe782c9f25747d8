//! The data source consumed by track renderers.

use crate::coordinator::FetchCoordinator;
use crate::events::{DataEvent, Subscription, Topic};
use crate::formats::decode_payload;
use crate::interval::ContigInterval;
use crate::storage::Storage;
use crate::variant::{Variant, VariantContext};
use crate::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Range-keyed access to variants and genotypes.
///
/// Consumers call [`range_changed`](Self::range_changed) when their view
/// moves, listen for `newdata`, and then re-run
/// [`variants_in_range`](Self::variants_in_range) or
/// [`genotypes_in_range`](Self::genotypes_in_range) against the cache.
/// Queries never block on loading and never fail; before a covering
/// `newdata` they may return a partial or empty result.
#[derive(Clone)]
pub struct VariantDataSource {
    coordinator: FetchCoordinator,
}

impl VariantDataSource {
    /// Source over a pre-fetched JSON payload. Every range is already
    /// loaded; a blank or `{}` payload is an empty source.
    pub fn from_json(json: &str) -> Result<Self> {
        let contexts = decode_payload(json)?;
        tracing::info!("loaded {} variant(s) from JSON payload", contexts.len());
        Self::from_contexts(contexts)
    }

    /// Fails with `SampleMismatch` unless every context has the same call
    /// sets as the first; calls listed in another order are reordered.
    pub fn from_contexts(contexts: Vec<VariantContext>) -> Result<Self> {
        Ok(Self {
            coordinator: FetchCoordinator::eager(contexts)?,
        })
    }

    /// Source that loads from `storage` as ranges are requested. Must be
    /// called from within a tokio runtime.
    pub fn from_storage(storage: Arc<dyn Storage>) -> Result<Self> {
        Ok(Self {
            coordinator: FetchCoordinator::lazy(storage)?,
        })
    }

    /// Declare interest in `range`. Returns immediately; completion is
    /// reported through `newdata` and `networkdone`.
    pub fn range_changed(&self, range: &ContigInterval) {
        let _ = self.coordinator.request(range.clone());
    }

    /// [`range_changed`](Self::range_changed) that also waits for this
    /// request's own completion. True if `newdata` fired for it.
    pub async fn load_range(&self, range: &ContigInterval) -> bool {
        self.coordinator.request(range.clone()).wait().await
    }

    pub fn is_loaded(&self, range: &ContigInterval) -> bool {
        self.coordinator.cache().read().is_covered(range)
    }

    pub fn variants_in_range(&self, range: Option<&ContigInterval>) -> Vec<Variant> {
        match range {
            Some(range) => self.coordinator.cache().read().variants_in(range),
            None => Vec::new(),
        }
    }

    pub fn genotypes_in_range(&self, range: Option<&ContigInterval>) -> Vec<VariantContext> {
        match range {
            Some(range) => self.coordinator.cache().read().contexts_in(range),
            None => Vec::new(),
        }
    }

    /// Sample names, ordered as every context's calls are.
    ///
    /// Resolves from the first loaded batch, or earlier from the storage's
    /// header when it has one. With nothing loaded and nothing loading, this
    /// returns an empty list rather than waiting.
    pub async fn call_names(&self) -> Vec<String> {
        let cell = self.coordinator.call_names();
        if let Some(names) = cell.get() {
            return names.to_vec();
        }

        if let Some(storage) = self.coordinator.storage() {
            match storage.sample_names().await {
                Ok(Some(names)) if !names.is_empty() => return cell.resolve(names).to_vec(),
                // an empty hint says nothing about the batches to come
                Ok(_) => {}
                Err(e) => tracing::warn!("failed to read sample names: {}", e),
            }
        }

        let mut names_rx = cell.subscribe();
        let mut pending_rx = self.coordinator.pending();
        loop {
            if let Some(names) = cell.get() {
                return names.to_vec();
            }
            if *pending_rx.borrow_and_update() == 0 {
                return Vec::new();
            }
            tokio::select! {
                changed = names_rx.changed() => {
                    if changed.is_err() {
                        return Vec::new();
                    }
                }
                changed = pending_rx.changed() => {
                    if changed.is_err() {
                        return Vec::new();
                    }
                }
            }
        }
    }

    pub fn on<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&DataEvent) + Send + Sync + 'static,
    {
        self.coordinator.events().on(topic, handler)
    }

    pub fn once<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&DataEvent) + Send + Sync + 'static,
    {
        self.coordinator.events().once(topic, handler)
    }

    pub fn off(&self, subscription: Subscription) -> bool {
        self.coordinator.events().off(subscription)
    }

    pub fn subscribe(&self, topic: Topic) -> (Subscription, mpsc::UnboundedReceiver<DataEvent>) {
        self.coordinator.events().channel(topic)
    }
}

//! Turns range requests into gap fetches and merges the results.
//!
//! For each request the coordinator
//! 1. computes the parts of the range the cache does not cover,
//! 2. subtracts gaps another request is already fetching and waits on those,
//! 3. fetches what remains, one task per gap,
//! 4. merges each successful batch and marks its gap covered,
//! 5. fires `newdata` for the requested range if every part succeeded, then
//!    `networkdone` unconditionally.
//!
//! A request with nothing to fetch fires both events before returning.

use crate::call_names::CallNames;
use crate::cache::VariantCache;
use crate::events::{DataEvent, EventEmitter};
use crate::interval::ContigInterval;
use crate::storage::Storage;
use crate::variant::VariantContext;
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinSet;

/// Outcome of a gap fetch: `None` while running, then whether it succeeded.
type GapState = watch::Receiver<Option<bool>>;

struct InFlight {
    range: ContigInterval,
    done: GapState,
}

impl InFlight {
    fn is_running(&self) -> bool {
        let finished = self.done.borrow().is_some();
        // a dropped sender without a result means the task died
        !finished && self.done.has_changed().is_ok()
    }
}

/// Resolves to true once `newdata` has fired for the request.
pub enum Completion {
    Ready(bool),
    Pending(oneshot::Receiver<bool>),
}

impl Completion {
    pub async fn wait(self) -> bool {
        match self {
            Completion::Ready(loaded) => loaded,
            Completion::Pending(rx) => rx.await.unwrap_or(false),
        }
    }
}

struct Inner {
    storage: Option<Arc<dyn Storage>>,
    cache: RwLock<VariantCache>,
    events: EventEmitter,
    call_names: CallNames,
    in_flight: Mutex<Vec<InFlight>>,
    pending: watch::Sender<usize>,
    runtime: Option<Handle>,
}

#[derive(Clone)]
pub struct FetchCoordinator {
    inner: Arc<Inner>,
}

impl FetchCoordinator {
    /// Coordinator over data that is already fully loaded. Every record's
    /// calls are put in the first record's sample order; a record with a
    /// different sample set is `SampleMismatch`.
    pub fn eager(contexts: Vec<VariantContext>) -> Result<Self> {
        let names = contexts
            .first()
            .map(VariantContext::call_set_names)
            .unwrap_or_default();
        let contexts = reindex_all(contexts, &names)?;
        Ok(Self::build(
            None,
            VariantCache::complete(contexts),
            CallNames::resolved(names),
            None,
        ))
    }

    /// Coordinator that loads from `storage` on demand. Must be created
    /// inside a tokio runtime; fetches are spawned onto it.
    pub fn lazy(storage: Arc<dyn Storage>) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Internal(format!("no tokio runtime for fetches: {}", e)))?;
        Ok(Self::build(
            Some(storage),
            VariantCache::new(),
            CallNames::pending(),
            Some(runtime),
        ))
    }

    fn build(
        storage: Option<Arc<dyn Storage>>,
        cache: VariantCache,
        call_names: CallNames,
        runtime: Option<Handle>,
    ) -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                storage,
                cache: RwLock::new(cache),
                events: EventEmitter::new(),
                call_names,
                in_flight: Mutex::new(Vec::new()),
                pending,
                runtime,
            }),
        }
    }

    pub fn cache(&self) -> &RwLock<VariantCache> {
        &self.inner.cache
    }

    pub fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    pub fn call_names(&self) -> &CallNames {
        &self.inner.call_names
    }

    pub fn storage(&self) -> Option<&Arc<dyn Storage>> {
        self.inner.storage.as_ref()
    }

    /// Requests currently waiting on fetches.
    pub fn pending(&self) -> watch::Receiver<usize> {
        self.inner.pending.subscribe()
    }

    pub fn request(&self, range: ContigInterval) -> Completion {
        let (fetches, waits) = self.plan(&range);

        if fetches.is_empty() && waits.is_empty() {
            tracing::debug!("{} already loaded", range);
            self.inner.events.emit(DataEvent::NewData(range));
            self.inner.events.emit(DataEvent::NetworkDone);
            return Completion::Ready(true);
        }

        let (storage, runtime) = match (&self.inner.storage, &self.inner.runtime) {
            (Some(storage), Some(runtime)) => (storage.clone(), runtime.clone()),
            _ => {
                // only reachable if a complete cache reported gaps
                tracing::error!("{} has gaps but no storage to fetch from", range);
                self.inner.events.emit(DataEvent::NetworkDone);
                return Completion::Ready(false);
            }
        };

        tracing::debug!(
            "{}: fetching {} gap(s), joining {} in-flight fetch(es)",
            range,
            fetches.len(),
            waits.len()
        );

        self.inner.pending.send_modify(|n| *n += 1);
        let (done_tx, done_rx) = oneshot::channel();
        let inner = self.inner.clone();
        runtime.spawn(async move {
            let mut tasks = JoinSet::new();
            for (gap, tx) in fetches {
                let inner = inner.clone();
                let storage = storage.clone();
                tasks.spawn(async move {
                    let ok = inner.fetch_gap(storage.as_ref(), &gap).await;
                    let _ = tx.send(Some(ok));
                    ok
                });
            }

            let mut loaded = true;
            while let Some(joined) = tasks.join_next().await {
                loaded &= joined.unwrap_or(false);
            }
            for mut state in waits {
                let joined = state
                    .wait_for(Option::is_some)
                    .await
                    .map(|outcome| (*outcome).unwrap_or(false))
                    .unwrap_or(false);
                loaded &= joined;
            }

            if loaded {
                inner.events.emit(DataEvent::NewData(range));
            }
            inner.events.emit(DataEvent::NetworkDone);
            inner.pending.send_modify(|n| *n = n.saturating_sub(1));
            let _ = done_tx.send(loaded);
        });

        Completion::Pending(done_rx)
    }

    /// Split `range` into gaps to fetch now and in-flight fetches to join.
    #[allow(clippy::type_complexity)]
    fn plan(
        &self,
        range: &ContigInterval,
    ) -> (Vec<(ContigInterval, watch::Sender<Option<bool>>)>, Vec<GapState>) {
        let mut in_flight = self.inner.in_flight.lock();
        // prune before reading the cache: a fetch marks its gap covered
        // before it reports done
        in_flight.retain(InFlight::is_running);

        let gaps = self.inner.cache.read().gaps(range);
        if gaps.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let running: Vec<ContigInterval> = in_flight.iter().map(|f| f.range.clone()).collect();
        let waits = in_flight
            .iter()
            .filter(|f| gaps.iter().any(|g| g.intersects(&f.range)))
            .map(|f| f.done.clone())
            .collect();

        let mut fetches = Vec::new();
        for gap in gaps.iter().flat_map(|g| g.subtract(&running)) {
            let (tx, rx) = watch::channel(None);
            in_flight.push(InFlight {
                range: gap.clone(),
                done: rx,
            });
            fetches.push((gap, tx));
        }

        (fetches, waits)
    }
}

impl Inner {
    async fn fetch_gap(&self, storage: &dyn Storage, gap: &ContigInterval) -> bool {
        tracing::debug!("fetching {}", gap);
        let batch = match storage.fetch(gap).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("fetch for {} failed: {}", gap, e);
                return false;
            }
        };

        let batch = match self.align_calls(batch) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("rejecting batch for {}: {}", gap, e);
                return false;
            }
        };

        let added = self.cache.write().merge(gap, batch);
        tracing::info!("{}: merged {} new variant(s)", gap, added);
        true
    }

    /// Put every record's calls in the source's sample order, establishing
    /// that order from this batch if it is not known yet.
    fn align_calls(&self, batch: Vec<VariantContext>) -> Result<Vec<VariantContext>> {
        let Some(first) = batch.first() else {
            return Ok(batch);
        };

        let names = match self.call_names.get() {
            Some(names) => names,
            None => {
                let candidate = first.call_set_names();
                let batch = reindex_all(batch, &candidate)?;
                let winner = self.call_names.resolve(candidate);
                return reindex_all(batch, &winner);
            }
        };
        reindex_all(batch, &names)
    }
}

fn reindex_all(batch: Vec<VariantContext>, names: &[String]) -> Result<Vec<VariantContext>> {
    let mut reordered = 0;
    let aligned = batch
        .into_iter()
        .map(|ctx| {
            if ctx.calls.iter().map(|c| &c.call_set_name).eq(names.iter()) {
                return Ok(ctx);
            }
            reordered += 1;
            ctx.reindexed(names).map_err(|ctx| {
                Error::SampleMismatch(format!(
                    "{}:{} has samples {:?}, expected {:?}",
                    ctx.variant.contig,
                    ctx.variant.position,
                    ctx.call_set_names(),
                    names
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if reordered > 0 {
        tracing::warn!("reordered calls of {} record(s) to match sample order", reordered);
    }
    Ok(aligned)
}

//! The collector: one mark-and-sweep pass per [`Collector::collect`] call.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use hoard_dag::DagService;
use hoard_pin::Pinner;
use hoard_store::{BlockStore, KeyIter};
use hoard_types::{Cid, Key};

use crate::colored::colored_set;
use crate::config::GcConfig;
use crate::error::{GcError, GcResult};
use crate::live::LiveSet;
use crate::observer::{GcEvent, GcObserver, TracingObserver};
use crate::stats::{SweepOutcome, SweepStats};

/// Runs collection passes over one store and pin registry.
pub struct Collector<S: ?Sized, P: ?Sized> {
    store: Arc<S>,
    pinner: Arc<P>,
    observer: Arc<dyn GcObserver>,
    config: GcConfig,
}

impl<S, P> Collector<S, P>
where
    S: BlockStore + ?Sized + 'static,
    P: Pinner + ?Sized,
{
    /// Create a collector that reports through `tracing`.
    pub fn new(store: Arc<S>, pinner: Arc<P>) -> Self {
        Self {
            store,
            pinner,
            observer: Arc::new(TracingObserver),
            config: GcConfig::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn GcObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_config(mut self, config: GcConfig) -> Self {
        self.config = config;
        self
    }

    /// Start a collection pass.
    ///
    /// Waits for the store's exclusive GC lock, then builds the live set.
    /// If marking or key enumeration fails, the lock is released and the
    /// error is returned; no block has been deleted.
    ///
    /// Otherwise a sweep task is spawned and its output returned as a
    /// [`GcStream`]. The task holds the lock until it stops, and releases it
    /// before the stream closes. Blocks are only read from the local store,
    /// even when `best_effort_roots` name content held elsewhere.
    ///
    /// The sweep reserves room in the stream before each deletion, so every
    /// deleted key is delivered unless the consumer has gone away.
    ///
    /// Cancelling `token` stops the sweep before its next deletion. Keys
    /// discovered after that are left in place; the stream closes without
    /// an error.
    pub async fn collect(
        &self,
        token: CancellationToken,
        best_effort_roots: &[Cid],
    ) -> GcResult<GcStream> {
        let unlocker = self.store.locker().gc_lock().await;
        self.observer.emit(&GcEvent::MarkStarted {
            best_effort_roots: best_effort_roots.len(),
        });

        // Early returns drop `unlocker`, which releases the lock.
        let dag = DagService::offline(Arc::clone(&self.store));
        let (live, _) = colored_set(
            self.pinner.as_ref(),
            &dag,
            best_effort_roots,
            self.observer.as_ref(),
        )?;
        let keys = self.store.all_keys().map_err(GcError::Enumerate)?;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity());
        let mut sweep = Sweep {
            store: Arc::clone(&self.store),
            observer: Arc::clone(&self.observer),
            live,
            keys,
            token,
            yield_every: self.config.yield_every(),
        };

        let task = tokio::spawn(async move {
            let stats = sweep.run(&tx).await;
            unlocker.unlock();
            sweep.observer.emit(&GcEvent::SweepFinished(stats.clone()));
            drop(tx);
            stats
        });

        Ok(GcStream { rx, task })
    }
}

/// Room for one item in the output stream, or why there is none.
enum Slot<'a> {
    Ready(mpsc::Permit<'a, GcResult<Key>>),
    Cancelled,
    Closed,
}

struct Sweep<S: ?Sized> {
    store: Arc<S>,
    observer: Arc<dyn GcObserver>,
    live: LiveSet,
    keys: KeyIter,
    token: CancellationToken,
    yield_every: usize,
}

impl<S: BlockStore + ?Sized> Sweep<S> {
    async fn run(&mut self, tx: &mpsc::Sender<GcResult<Key>>) -> SweepStats {
        let mut stats = SweepStats::default();
        let mut retained_run = 0usize;

        stats.outcome = loop {
            if self.token.is_cancelled() {
                break SweepOutcome::Cancelled;
            }
            if tx.is_closed() {
                debug!("gc stream dropped by consumer");
                break SweepOutcome::Disconnected;
            }

            let key = match self.keys.next() {
                None => break SweepOutcome::Completed,
                Some(Ok(key)) => key,
                Some(Err(source)) => {
                    let error = GcError::EnumerationInterrupted(source);
                    warn!(%error, "sweep stopped");
                    let reason = error.to_string();
                    if let Slot::Ready(permit) = reserve_slot(&self.token, tx).await {
                        permit.send(Err(error));
                    }
                    break SweepOutcome::Failed(reason);
                }
            };
            stats.scanned += 1;

            if self.live.contains(&key) {
                stats.retained += 1;
                retained_run += 1;
                if retained_run % self.yield_every == 0 {
                    tokio::task::yield_now().await;
                }
                continue;
            }
            retained_run = 0;

            // Room in the stream is secured first, so a deleted key is
            // always delivered.
            let permit = match reserve_slot(&self.token, tx).await {
                Slot::Ready(permit) => permit,
                Slot::Cancelled => break SweepOutcome::Cancelled,
                Slot::Closed => {
                    debug!("gc stream dropped by consumer");
                    break SweepOutcome::Disconnected;
                }
            };
            if self.token.is_cancelled() {
                break SweepOutcome::Cancelled;
            }

            if let Err(source) = self.store.delete(&key) {
                let error = GcError::Delete { key, source };
                warn!(%error, "sweep stopped");
                let reason = error.to_string();
                permit.send(Err(error));
                break SweepOutcome::Failed(reason);
            }
            stats.removed += 1;
            self.observer.emit(&GcEvent::Removed { key });
            permit.send(Ok(key));
        };

        stats
    }
}

/// Wait for room in the output stream unless the pass is cancelled first.
///
/// Free capacity wins over a pending cancellation.
async fn reserve_slot<'a>(
    token: &CancellationToken,
    tx: &'a mpsc::Sender<GcResult<Key>>,
) -> Slot<'a> {
    tokio::select! {
        biased;
        permit = tx.reserve() => match permit {
            Ok(permit) => Slot::Ready(permit),
            Err(_) => Slot::Closed,
        },
        () = token.cancelled() => Slot::Cancelled,
    }
}

/// The output of a running sweep.
///
/// Yields each deleted key in deletion order. A sweep error is delivered as
/// the final item. The stream ends once the sweep has stopped and released
/// the GC lock. Dropping the stream stops the sweep before its next
/// deletion.
#[derive(Debug)]
pub struct GcStream {
    rx: mpsc::Receiver<GcResult<Key>>,
    task: JoinHandle<SweepStats>,
}

impl GcStream {
    /// The next deleted key, or `None` once the sweep has stopped.
    pub async fn next(&mut self) -> Option<GcResult<Key>> {
        self.rx.recv().await
    }

    /// Consume the whole stream, returning the deleted keys.
    ///
    /// Fails with the sweep's error if it stopped on one.
    pub async fn collect_keys(mut self) -> GcResult<Vec<Key>> {
        let mut removed = Vec::new();
        while let Some(item) = self.next().await {
            removed.push(item?);
        }
        Ok(removed)
    }

    /// Consume the whole stream and return the sweep's counters.
    pub async fn finish(mut self) -> GcResult<SweepStats> {
        while let Some(item) = self.next().await {
            item?;
        }
        self.task
            .await
            .map_err(|e| GcError::SweepAborted(e.to_string()))
    }
}

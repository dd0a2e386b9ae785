//! The synchronization engine: debounce wiring, single-flight save
//! execution, baseline and identity management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{RwLock, watch};

use crate::clock::DirtyClock;
use crate::config::AutoSaveConfig;
use crate::debounce::DebounceTimer;
use crate::error::Result;
use crate::identity::{DocumentId, IdentityCell};
use crate::snapshot::DocumentSnapshot;
use crate::status::{SaveStatus, StatusCell};
use crate::store::DocumentStore;

/// Callback invoked when a draft gains its server identity.
pub type IdentityPromotedFn = dyn Fn(DocumentId) + Send + Sync;

/// Session state guarded by one mutex so baseline, identity, and edit clock
/// always move together.
struct SessionState {
    /// Snapshot of the last successful save (or the initially loaded
    /// document). Dirtiness is `current != baseline`, never stored.
    baseline: DocumentSnapshot,
    identity: IdentityCell,
    clock: DirtyClock,
}

struct EngineInner<D> {
    document: Arc<RwLock<D>>,
    store: Arc<dyn DocumentStore>,
    config: AutoSaveConfig,
    session: Mutex<SessionState>,
    debounce: Mutex<DebounceTimer>,
    /// Single-flight guard: at most one persistence call in flight.
    in_flight: AtomicBool,
    /// Set on shutdown; a save completing afterwards is discarded.
    closed: AtomicBool,
    status: StatusCell,
    identity_tx: watch::Sender<Option<DocumentId>>,
    on_promoted: Option<Box<IdentityPromotedFn>>,
}

/// Auto-save synchronization engine for one editing session.
///
/// Owns the baseline snapshot, the server identity, and the save status for
/// a single live document. Edits are reported with
/// [`document_changed`](Self::document_changed); the engine coalesces them
/// behind a debounce window, persists through the [`DocumentStore`]
/// collaborator with at most one call in flight, and promotes a client-only
/// draft to a persisted entity on its first successful save.
///
/// Cloning is cheap and shares the session; construct one engine per editor
/// session and call [`shutdown`](Self::shutdown) on teardown.
pub struct SyncEngine<D> {
    inner: Arc<EngineInner<D>>,
}

impl<D> Clone for SyncEngine<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for [`SyncEngine`].
pub struct SyncEngineBuilder<D> {
    document: Arc<RwLock<D>>,
    store: Arc<dyn DocumentStore>,
    config: AutoSaveConfig,
    identity: Option<DocumentId>,
    on_promoted: Option<Box<IdentityPromotedFn>>,
}

impl<D> SyncEngineBuilder<D>
where
    D: Serialize + Send + Sync + 'static,
{
    /// Use a non-default auto-save configuration.
    pub fn config(mut self, config: AutoSaveConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the session with an already-persisted identity (editing an
    /// existing document).
    pub fn identity(mut self, id: DocumentId) -> Self {
        self.identity = Some(id);
        self
    }

    /// Register a callback for the one-time draft-to-persisted promotion,
    /// so the owning component can re-point dependent actions (export,
    /// lock, send) at the new identity.
    pub fn on_identity_promoted<F>(mut self, callback: F) -> Self
    where
        F: Fn(DocumentId) + Send + Sync + 'static,
    {
        self.on_promoted = Some(Box::new(callback));
        self
    }

    /// Seed the baseline from the current document and finish construction.
    ///
    /// The just-loaded state is the baseline, so it is not mistaken for
    /// unsaved edits.
    pub async fn build(self) -> Result<SyncEngine<D>> {
        let baseline = {
            let document = self.document.read().await;
            DocumentSnapshot::capture(&*document)?
        };

        let (identity_tx, _) = watch::channel(self.identity.clone());

        Ok(SyncEngine {
            inner: Arc::new(EngineInner {
                document: self.document,
                store: self.store,
                config: self.config,
                session: Mutex::new(SessionState {
                    baseline,
                    identity: IdentityCell::new(self.identity),
                    clock: DirtyClock::new(),
                }),
                debounce: Mutex::new(DebounceTimer::new()),
                in_flight: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                status: StatusCell::new(),
                identity_tx,
                on_promoted: self.on_promoted,
            }),
        })
    }
}

impl<D> SyncEngine<D>
where
    D: Serialize + Send + Sync + 'static,
{
    /// Start building an engine for `document`, persisting through `store`.
    pub fn builder(
        document: Arc<RwLock<D>>,
        store: Arc<dyn DocumentStore>,
    ) -> SyncEngineBuilder<D> {
        SyncEngineBuilder {
            document,
            store,
            config: AutoSaveConfig::default(),
            identity: None,
            on_promoted: None,
        }
    }

    /// Report that the live document was edited.
    ///
    /// Marks the status dirty and re-arms the debounce timer; when the
    /// stream of edits goes quiet for the debounce window (or the max-delay
    /// bound is hit), a save is triggered. No-op after shutdown.
    pub fn document_changed(&self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        self.inner.status.mark_dirty();

        let delay = {
            let mut session = self.inner.session.lock().unwrap();
            session.clock.mark_change();
            session.clock.delay_until_save(&self.inner.config)
        };

        if !self.inner.config.enabled {
            return;
        }

        let engine = self.clone();
        self.inner
            .debounce
            .lock()
            .unwrap()
            .schedule(delay, async move {
                engine.trigger().await;
            });
    }

    /// Save the current document now, unless clean or already saving.
    ///
    /// The single entry point for both the debounce timer and a manual
    /// save. Re-encodes the *live* document at execution time, so edits
    /// made between scheduling and execution are never lost to a stale
    /// capture. Persistence failures never propagate to the caller; they
    /// surface as [`SaveState::Error`](crate::SaveState::Error) status and
    /// the unchanged baseline keeps the document retryable.
    pub async fn trigger(&self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        // Single-flight: checked-and-set atomically, released by the guard
        // on every exit path.
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("Save already in flight, skipping trigger");
            return;
        }
        let _guard = FlightGuard(&self.inner.in_flight);

        let current = {
            let document = self.inner.document.read().await;
            DocumentSnapshot::capture(&*document)
        };
        let current = match current {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("Failed to encode document for save: {e}");
                self.inner.status.set_error(e.to_string());
                return;
            }
        };

        let identity = {
            let mut session = self.inner.session.lock().unwrap();
            if current == session.baseline {
                // Debounce fired after the user undid their change.
                tracing::trace!("Document clean, nothing to save");
                session.clock.clear();
                drop(session);
                self.inner.status.revert_dirty_to_idle();
                return;
            }
            // An attempt is being dispatched: restart the max-delay budget
            // now, so a failing store still gets debounced retries instead
            // of one attempt per keystroke.
            session.clock.clear();
            session.identity.current()
        };

        self.inner.status.set_saving();
        tracing::debug!(
            has_identity = identity.is_some(),
            "Persisting document snapshot"
        );

        let outcome = match identity {
            None => self.inner.store.create(&current).await.map(Some),
            Some(id) => self.inner.store.update(id, &current).await.map(|()| None),
        };

        match outcome {
            Ok(assigned) => {
                if self.inner.closed.load(Ordering::SeqCst) {
                    tracing::warn!("Save completed after session teardown, result discarded");
                    return;
                }

                // Atomic commit: baseline and identity advance together,
                // only on full success. The clock was already rebased at
                // dispatch; edits that landed since then keep their marks.
                let promoted = {
                    let mut session = self.inner.session.lock().unwrap();
                    session.baseline = current;
                    match assigned {
                        Some(id) => {
                            session.identity.promote(id.clone());
                            Some(id)
                        }
                        None => None,
                    }
                };

                if let Some(id) = promoted {
                    tracing::info!(%id, "Draft promoted to persisted document");
                    self.inner.identity_tx.send_replace(Some(id.clone()));
                    if let Some(callback) = &self.inner.on_promoted {
                        callback(id);
                    }
                }

                self.inner.status.set_saved(Utc::now());

                // Edits that landed while the save was in flight keep the
                // indicator honest: flip straight back to dirty.
                if matches!(self.check_dirty().await, Ok(true)) {
                    self.inner.status.mark_dirty();
                } else {
                    let engine = self.clone();
                    let display = self.inner.config.saved_display();
                    tokio::spawn(async move {
                        tokio::time::sleep(display).await;
                        engine.inner.status.revert_saved_to_idle();
                    });
                }
            }
            Err(e) => {
                if self.inner.closed.load(Ordering::SeqCst) {
                    tracing::warn!("Save failed after session teardown, result discarded");
                    return;
                }

                // Baseline untouched: the document stays logically dirty
                // and the next cycle or a manual retry resubmits it.
                tracing::error!("Failed to save document: {e:#}");
                self.inner.status.set_error(format!("{e:#}"));
            }
        }
    }

    /// Manual retry from the error state. Identical to [`trigger`](Self::trigger).
    pub async fn retry(&self) {
        self.trigger().await;
    }

    /// Whether the live document differs from the last persisted state.
    pub async fn is_dirty(&self) -> Result<bool> {
        self.check_dirty().await
    }

    async fn check_dirty(&self) -> Result<bool> {
        let current = {
            let document = self.inner.document.read().await;
            DocumentSnapshot::capture(&*document)?
        };
        let session = self.inner.session.lock().unwrap();
        Ok(current != session.baseline)
    }

    /// Re-seed the session from the current document.
    ///
    /// Used when the editor is freshly loaded with server data: the
    /// just-loaded state becomes the baseline (so it is not mistaken for
    /// unsaved edits), the identity is replaced with the loaded entity's,
    /// and any pending timer or error indicator is cleared.
    pub async fn reset(&self, identity: Option<DocumentId>) -> Result<()> {
        self.inner.debounce.lock().unwrap().cancel();

        let baseline = {
            let document = self.inner.document.read().await;
            DocumentSnapshot::capture(&*document)?
        };

        {
            let mut session = self.inner.session.lock().unwrap();
            session.baseline = baseline;
            session.identity.reset(identity.clone());
            session.clock.clear();
        }

        self.inner.identity_tx.send_replace(identity);
        self.inner.status.reset();
        tracing::debug!("Sync session reset");
        Ok(())
    }

    /// Tear down the session: cancel pending timers and mark the engine
    /// closed.
    ///
    /// An in-flight persistence call is not aborted, but its result is
    /// discarded; it can no longer advance the baseline or promote the
    /// identity.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.debounce.lock().unwrap().cancel();
        tracing::debug!("Sync engine shut down");
    }

    /// Current server identity, if the document has been persisted.
    pub fn identity(&self) -> Option<DocumentId> {
        self.inner.session.lock().unwrap().identity.current()
    }

    /// Reactive feed of the server identity; yields `Some` once promoted.
    pub fn subscribe_identity(&self) -> watch::Receiver<Option<DocumentId>> {
        self.inner.identity_tx.subscribe()
    }

    /// Current save status.
    pub fn status(&self) -> SaveStatus {
        self.inner.status.current()
    }

    /// Reactive feed of the save status for UI indicators.
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status.subscribe()
    }

    /// Handle to the live document shared with the editor.
    pub fn document(&self) -> Arc<RwLock<D>> {
        Arc::clone(&self.inner.document)
    }
}

/// Releases the single-flight flag on drop, covering every exit path of
/// [`SyncEngine::trigger`].
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

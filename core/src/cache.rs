//! Synchronization layer: one shared, cached view of the remote list.
//!
//! # Design
//! The whole process shares a single cache entry for the todo collection,
//! identified by [`CACHE_KEY`]. Consumers observe it through a
//! `tokio::sync::watch` channel as a [`ListState`]; at most one list fetch
//! is ever outstanding, and callers arriving while one is in flight await
//! that same fetch instead of issuing another.
//!
//! Fetches run in spawned tasks, so a caller that navigates away mid-request
//! neither cancels the fetch nor corrupts the shared entry — the response
//! still lands in the cache. Mutations invalidate the entry only after the
//! store acknowledges them; invalidations that arrive while a fetch is
//! already running coalesce into a single follow-up pass.

use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::client::RemoteStore;
use crate::error::TransportError;
use crate::http::Transport;
use crate::types::{CreateAck, Todo, TodoDraft, TodoId};

/// Label of the one cache entry, used on its diagnostics.
pub const CACHE_KEY: &str = "todos";

/// Observable state of the cached todo list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    /// No data yet: nothing has been fetched, or a fetch is in flight with
    /// no prior data to show.
    Pending,
    /// The last fetch failed. Prior data is discarded, not served stale.
    Error(TransportError),
    /// The most recent successfully fetched snapshot.
    Ready(Vec<Todo>),
}

impl ListState {
    /// The ready set, or empty for `Pending`/`Error` — those states render
    /// as a status indicator, not as data.
    pub fn todos(&self) -> &[Todo] {
        match self {
            ListState::Ready(todos) => todos,
            _ => &[],
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ListState::Ready(_))
    }
}

#[derive(Default)]
struct FetchFlags {
    /// A fetch task is currently running.
    in_flight: bool,
    /// An invalidation landed mid-fetch; run exactly one follow-up pass.
    rerun: bool,
}

struct CacheInner<T> {
    store: RemoteStore<T>,
    state: watch::Sender<ListState>,
    flags: Mutex<FetchFlags>,
}

/// Cheaply cloneable handle to the process-wide todo cache.
pub struct TodoCache<T> {
    inner: Arc<CacheInner<T>>,
}

impl<T> Clone for TodoCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport + 'static> TodoCache<T> {
    pub fn new(store: RemoteStore<T>) -> Self {
        let (state, _) = watch::channel(ListState::Pending);
        Self {
            inner: Arc::new(CacheInner {
                store,
                state,
                flags: Mutex::new(FetchFlags::default()),
            }),
        }
    }

    /// Current snapshot without touching the network.
    pub fn current(&self) -> ListState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state transitions of the cached list.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.inner.state.subscribe()
    }

    /// Resolve the todo list, fetching only when needed.
    ///
    /// A cached `Ready` value returns immediately with no network call, so
    /// re-entering a view never duplicates a satisfied fetch. `Pending`
    /// (never fetched) and `Error` (caller-initiated retry) start a fetch;
    /// if one is already in flight the caller awaits that same fetch. When
    /// an invalidation coalesces into a rerun, the caller resolves only at
    /// the final settle, so it never observes pre-mutation data as final.
    pub async fn list(&self) -> Result<Vec<Todo>, TransportError> {
        let mut rx = self.inner.state.subscribe();
        {
            let flags = self.inner.flags.lock().await;
            if !flags.in_flight {
                if let ListState::Ready(todos) = &*rx.borrow_and_update() {
                    return Ok(todos.clone());
                }
                self.start_fetch(flags);
            }
        }
        loop {
            if rx.changed().await.is_err() {
                // The sender lives inside this handle; unreachable while a
                // borrow of `self` is held.
                return Err(TransportError::Network("cache torn down".to_string()));
            }
            if self.inner.flags.lock().await.in_flight {
                continue;
            }
            let settled = rx.borrow().clone();
            match settled {
                ListState::Ready(todos) => return Ok(todos),
                ListState::Error(err) => return Err(err),
                ListState::Pending => continue,
            }
        }
    }

    /// Discard the cached value and schedule a refetch.
    ///
    /// Runs after every acknowledged mutation. With a fetch already in
    /// flight this only marks a rerun: any number of invalidations during
    /// one fetch schedule at most one follow-up.
    pub async fn invalidate(&self) {
        let mut flags = self.inner.flags.lock().await;
        if flags.in_flight {
            debug!(key = CACHE_KEY, "invalidation coalesced into running fetch");
            flags.rerun = true;
        } else {
            debug!(key = CACHE_KEY, "invalidated, refetching");
            self.start_fetch(flags);
        }
    }

    /// Submit a new record. Invalidates only on success; the assigned key
    /// in the ack becomes addressable once the refetch delivers it.
    pub async fn create(&self, draft: &TodoDraft) -> Result<CreateAck, TransportError> {
        let ack = self.inner.store.create(draft).await?;
        self.invalidate().await;
        Ok(ack)
    }

    /// Replace the record stored under `todo.id`. Invalidates only on
    /// success; a failed update leaves the cache untouched.
    pub async fn update(&self, todo: &Todo) -> Result<(), TransportError> {
        self.inner.store.update(todo).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Remove the record at `id`. Invalidates only on success.
    pub async fn delete(&self, id: &TodoId) -> Result<(), TransportError> {
        self.inner.store.delete(id).await?;
        self.invalidate().await;
        Ok(())
    }

    /// Mark the entry in flight and spawn the fetch task. Takes the flag
    /// guard so the decision to start and the marking are one step.
    fn start_fetch(&self, mut flags: MutexGuard<'_, FetchFlags>) {
        flags.in_flight = true;
        // Keep stale `Ready` data visible while the refetch runs; publish
        // `Pending` only when there is no prior data to show.
        if !self.inner.state.borrow().is_ready() {
            self.inner.state.send_replace(ListState::Pending);
        }
        drop(flags);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.run_fetches().await;
        });
    }
}

impl<T: Transport> CacheInner<T> {
    /// One fetch, plus at most one rerun if an invalidation landed while
    /// it was running. Settles the state and the in-flight flag together.
    async fn run_fetches(&self) {
        loop {
            debug!(key = CACHE_KEY, "fetching todo list");
            let result = self.store.list().await;
            let mut flags = self.flags.lock().await;
            match result {
                Ok(todos) => {
                    debug!(key = CACHE_KEY, count = todos.len(), "todo list ready");
                    self.state.send_replace(ListState::Ready(todos));
                }
                Err(err) => {
                    warn!(key = CACHE_KEY, error = %err, "todo list fetch failed");
                    self.state.send_replace(ListState::Error(err));
                }
            }
            if flags.rerun {
                flags.rerun = false;
                drop(flags);
                continue;
            }
            flags.in_flight = false;
            break;
        }
    }
}

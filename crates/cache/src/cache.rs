use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use tillbook_core::RemoteError;
use tillbook_store::EntityStore;

use crate::data::{FromQueryData, QueryData};
use crate::fetch;
use crate::key::{Collection, Invalidation, QueryKey};
use crate::snapshot::{QuerySnapshot, QueryStatus, QuerySubscription};

type FetchOutcome = Result<Arc<QueryData>, RemoteError>;

#[derive(Debug)]
struct InFlight {
    seq: u64,
    receiver: watch::Receiver<Option<FetchOutcome>>,
}

impl InFlight {
    /// False once the fetch task is gone without publishing a result.
    fn is_alive(&self) -> bool {
        self.receiver.has_changed().is_ok()
    }
}

#[derive(Debug)]
struct Entry {
    data: Option<Arc<QueryData>>,
    error: Option<RemoteError>,
    status: QueryStatus,
    stale: bool,
    updated_at: Option<DateTime<Utc>>,
    /// Bumped by every invalidation of this key.
    generation: u64,
    /// Sequence number of the fetch that produced `data`.
    data_seq: u64,
    inflight: Option<InFlight>,
    subscribers: Vec<mpsc::UnboundedSender<QuerySnapshot>>,
}

impl Entry {
    /// `floor_seq` keeps results of fetches issued before this entry existed
    /// (e.g. before a `clear`) from landing in it.
    fn new(floor_seq: u64) -> Self {
        Self {
            data: None,
            error: None,
            status: QueryStatus::Idle,
            stale: false,
            updated_at: None,
            generation: 0,
            data_seq: floor_seq,
            inflight: None,
            subscribers: Vec::new(),
        }
    }

    fn is_stale(&self, max_age: Option<Duration>, now: DateTime<Utc>) -> bool {
        self.stale
            || max_age
                .zip(self.updated_at)
                .is_some_and(|(age, at)| now - at > age)
    }

    fn has_live_fetch(&self) -> bool {
        self.inflight.as_ref().is_some_and(InFlight::is_alive)
    }

    /// Status once no fetch is tracked for the key.
    fn settle(&mut self) {
        self.status = if self.data.is_some() {
            QueryStatus::Success
        } else if self.error.is_some() {
            QueryStatus::Error
        } else {
            QueryStatus::Idle
        };
    }

    fn snapshot(&self, key: &QueryKey, max_age: Option<Duration>) -> QuerySnapshot {
        QuerySnapshot {
            key: key.clone(),
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_stale: self.is_stale(max_age, Utc::now()),
            updated_at: self.updated_at,
        }
    }

    fn publish(&mut self, key: &QueryKey, max_age: Option<Duration>) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot(key, max_age);
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

struct Shared<S> {
    store: Arc<S>,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    max_age: Option<Duration>,
    seq: AtomicU64,
}

/// Keyed read cache over an [`EntityStore`].
///
/// - At most one fetch per key is in flight; concurrent readers share it.
/// - Invalidated values stay readable (marked stale) while a refetch runs.
/// - A fetch that started before an invalidation never marks the key fresh,
///   and an older fetch never overwrites the result of a newer one.
/// - Without a session no call is issued and reads fail with
///   [`RemoteError::NoSession`].
///
/// Fetches run as tokio tasks; reads must be awaited inside a tokio runtime.
/// Cloning is cheap and clones share state.
pub struct QueryCache<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for QueryCache<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> core::fmt::Debug for QueryCache<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries().len())
            .field("max_age", &self.shared.max_age)
            .finish()
    }
}

impl<S> QueryCache<S> {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.shared
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.shared.store
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.shared.max_age
    }

    /// Current state of `key` without triggering a fetch.
    pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        self.entries()
            .get(key)
            .map(|e| e.snapshot(key, self.shared.max_age))
            .unwrap_or_else(|| QuerySnapshot::idle(key.clone()))
    }

    /// Last value held for `key`, fresh or stale.
    pub fn peek(&self, key: &QueryKey) -> Option<Arc<QueryData>> {
        self.entries().get(key).and_then(|e| e.data.clone())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries().contains_key(key)
    }

    /// Drop one key. Its subscriptions end.
    pub fn remove(&self, key: &QueryKey) {
        self.entries().remove(key);
    }

    /// Drop every key, ending all subscriptions. Results of fetches still in
    /// flight are discarded.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let dropped = entries.len();
        entries.clear();
        tracing::info!(dropped, "query cache cleared");
    }
}

impl<S> QueryCache<S>
where
    S: EntityStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_max_age(store, None)
    }

    /// Values older than `max_age` count as stale even without an
    /// invalidation.
    pub fn with_max_age(store: Arc<S>, max_age: Option<Duration>) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                entries: Mutex::new(HashMap::new()),
                max_age,
                seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn session_active(&self) -> bool {
        self.shared.store.session_active()
    }

    fn ensure_session(&self, key: &QueryKey) -> Result<(), RemoteError> {
        if self.session_active() {
            Ok(())
        } else {
            tracing::debug!(key = %key, "no session; query not issued");
            Err(RemoteError::NoSession)
        }
    }

    /// Cached value if any (a stale one triggers a background refresh),
    /// otherwise the result of a fetch shared with concurrent callers.
    pub async fn fetch_or_cached(&self, key: &QueryKey) -> Result<Arc<QueryData>, RemoteError> {
        self.ensure_session(key)?;
        let receiver = {
            let mut entries = self.entries();
            let floor = self.shared.seq.load(Ordering::SeqCst);
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(floor));
            if let Some(data) = entry.data.clone() {
                if entry.is_stale(self.shared.max_age, Utc::now()) && !entry.has_live_fetch() {
                    tracing::debug!(key = %key, "serving stale value; refreshing");
                    self.start_fetch(key, entry, &Handle::current());
                }
                return Ok(data);
            }
            self.join_or_start(key, entry, &Handle::current())
        };
        wait(receiver).await
    }

    /// A value that is not stale: the cached one if fresh, otherwise the
    /// result of the refetch.
    pub async fn fetch_latest(&self, key: &QueryKey) -> Result<Arc<QueryData>, RemoteError> {
        self.ensure_session(key)?;
        let receiver = {
            let mut entries = self.entries();
            let floor = self.shared.seq.load(Ordering::SeqCst);
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(floor));
            if let Some(data) = &entry.data {
                if !entry.is_stale(self.shared.max_age, Utc::now()) {
                    return Ok(Arc::clone(data));
                }
            }
            self.join_or_start(key, entry, &Handle::current())
        };
        wait(receiver).await
    }

    pub async fn fetch_as<T: FromQueryData>(&self, key: &QueryKey) -> Result<T, RemoteError> {
        let data = self.fetch_or_cached(key).await?;
        T::from_query_data(&data).ok_or_else(|| RemoteError::UnexpectedPayload(key.to_string()))
    }

    pub async fn fetch_latest_as<T: FromQueryData>(&self, key: &QueryKey) -> Result<T, RemoteError> {
        let data = self.fetch_latest(key).await?;
        T::from_query_data(&data).ok_or_else(|| RemoteError::UnexpectedPayload(key.to_string()))
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.apply(&Invalidation::Key(key.clone()));
    }

    /// Invalidate every key of `collection` whatever its parameters.
    pub fn invalidate_collection(&self, collection: Collection) {
        self.apply(&Invalidation::Collection(collection));
    }

    /// Mark matching keys stale. Fetches already in flight for them are
    /// detached: their results may still be stored but never count as fresh.
    /// Keys with live subscribers are refetched right away.
    pub fn apply(&self, invalidation: &Invalidation) {
        let handle = Handle::try_current().ok();
        let session = self.session_active();
        let max_age = self.shared.max_age;
        let mut entries = self.entries();
        let mut touched = 0usize;
        for (key, entry) in entries.iter_mut() {
            if !invalidation.matches(key) {
                continue;
            }
            touched += 1;
            entry.generation += 1;
            entry.stale = true;
            entry.inflight = None;
            entry.settle();
            entry.subscribers.retain(|tx| !tx.is_closed());
            match &handle {
                Some(handle) if session && !entry.subscribers.is_empty() => {
                    self.start_fetch(key, entry, handle);
                }
                _ => entry.publish(key, max_age),
            }
        }
        tracing::debug!(invalidation = ?invalidation, touched, "queries invalidated");
    }

    /// Observe `key`. The first snapshot is the current state; a fetch is
    /// started when there is no fresh value.
    pub fn subscribe(&self, key: &QueryKey) -> QuerySubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let session = self.session_active();
        let max_age = self.shared.max_age;
        let mut entries = self.entries();
        let floor = self.shared.seq.load(Ordering::SeqCst);
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(floor));

        let _ = sender.send(entry.snapshot(key, max_age));
        entry.subscribers.push(sender);

        let needs_fetch = entry.data.is_none() || entry.is_stale(max_age, Utc::now());
        if needs_fetch && session && !entry.has_live_fetch() {
            if let Ok(handle) = Handle::try_current() {
                self.start_fetch(key, entry, &handle);
            }
        }
        QuerySubscription::new(key.clone(), receiver)
    }

    fn join_or_start(
        &self,
        key: &QueryKey,
        entry: &mut Entry,
        handle: &Handle,
    ) -> watch::Receiver<Option<FetchOutcome>> {
        match &entry.inflight {
            Some(inflight) if inflight.is_alive() => inflight.receiver.clone(),
            _ => self.start_fetch(key, entry, handle),
        }
    }

    fn start_fetch(
        &self,
        key: &QueryKey,
        entry: &mut Entry,
        handle: &Handle,
    ) -> watch::Receiver<Option<FetchOutcome>> {
        let seq = self.shared.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let started_generation = entry.generation;
        let (sender, receiver) = watch::channel(None);
        entry.inflight = Some(InFlight {
            seq,
            receiver: receiver.clone(),
        });
        entry.status = QueryStatus::Loading;
        entry.publish(key, self.shared.max_age);
        tracing::debug!(key = %key, seq, "query fetch started");

        let cache = self.clone();
        let key = key.clone();
        handle.spawn(async move {
            let outcome = fetch::fetch(cache.shared.store.as_ref(), &key)
                .await
                .map(Arc::new);
            cache.complete(&key, seq, started_generation, &outcome);
            sender.send_replace(Some(outcome));
        });
        receiver
    }

    fn complete(&self, key: &QueryKey, seq: u64, started_generation: u64, outcome: &FetchOutcome) {
        let max_age = self.shared.max_age;
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(key = %key, seq, "result for a dropped key discarded");
            return;
        };
        let current = entry.inflight.as_ref().is_some_and(|f| f.seq == seq);
        if current {
            entry.inflight = None;
        }
        match outcome {
            Ok(data) => {
                if seq <= entry.data_seq {
                    tracing::debug!(key = %key, seq, "older result discarded");
                    return;
                }
                entry.data = Some(Arc::clone(data));
                entry.data_seq = seq;
                entry.error = None;
                entry.updated_at = Some(Utc::now());
                entry.stale = started_generation != entry.generation;
                if entry.inflight.is_none() {
                    entry.status = QueryStatus::Success;
                }
                tracing::debug!(key = %key, seq, stale = entry.stale, "query fetch completed");
            }
            Err(err) => {
                if !current {
                    tracing::debug!(key = %key, seq, error = %err, "superseded fetch failed");
                    return;
                }
                tracing::warn!(key = %key, error = %err, "query fetch failed");
                entry.error = Some(err.clone());
                entry.status = QueryStatus::Error;
            }
        }
        entry.publish(key, max_age);
    }
}

async fn wait(mut receiver: watch::Receiver<Option<FetchOutcome>>) -> FetchOutcome {
    loop {
        let current = receiver.borrow_and_update().clone();
        if let Some(outcome) = current {
            return outcome;
        }
        if receiver.changed().await.is_err() {
            return Err(RemoteError::Transport(
                "query fetch ended without a result".to_string(),
            ));
        }
    }
}

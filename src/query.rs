//! Async query abstraction for data fetching with caching support.
//!
//! Inspired by TanStack Query, this module provides a `Query<T>` type that
//! encapsulates async data fetching, loading states, and error handling, a
//! `QueryClient` that owns queries by key and invalidates them, and a
//! `Mutation<T, E>` for one-shot writes.
//!
//! Fetches run on spawned tasks and report back over a channel. Nothing is
//! applied until the owner calls `poll()` on its event-loop tick, so all state
//! is read and written from a single logical thread.
//!
//! # Example
//!
//! ```ignore
//! let mut queries = QueryClient::new();
//! let store = store.clone();
//! queries.mount(EMPLOYEE_DETAILS, move || {
//!     let store = store.clone();
//!     async move { store.list().await.map_err(|e| e.to_string()) }
//! });
//!
//! // In event loop tick
//! if queries.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // After a successful write
//! queries.invalidate(&EMPLOYEE_DETAILS);
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// Identity of a cached query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Cow<'static, str>);

impl QueryKey {
  pub const fn from_static(key: &'static str) -> Self {
    Self(Cow::Borrowed(key))
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// The employee list
pub const EMPLOYEE_DETAILS: QueryKey = QueryKey::from_static("employee_details");

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// Fetch result tagged with the sequence number of the fetch that produced it
type Tagged<T> = (u64, Result<T, String>);

/// Async query for data fetching with state management.
///
/// Query<T> encapsulates:
/// - The fetching logic (via a closure)
/// - Loading/success/error states, keeping the last good value while reloading
/// - Invalidation that is queued, not dropped, while a fetch is in flight
/// - Sequence-tagged results so superseded responses are discarded
pub struct Query<T> {
  state: QueryState<T>,
  /// Last successful value, kept while a re-fetch is loading
  previous: Option<T>,
  fetcher: FetcherFn<T>,
  tx: mpsc::UnboundedSender<Tagged<T>>,
  rx: mpsc::UnboundedReceiver<Tagged<T>>,
  /// Sequence number of the most recently started fetch
  seq: u64,
  in_flight: bool,
  /// Invalidated while a fetch was in flight
  refetch_queued: bool,
  fetch_count: u64,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time a fetch starts.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      state: QueryState::Idle,
      previous: None,
      fetcher: Box::new(move || fetcher().boxed()),
      tx,
      rx,
      seq: 0,
      in_flight: false,
      refetch_queued: false,
      fetch_count: 0,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Latest successful data. While a re-fetch is loading this is the value
  /// from before it started.
  pub fn data(&self) -> Option<&T> {
    match &self.state {
      QueryState::Loading => self.previous.as_ref(),
      state => state.data(),
    }
  }

  /// How many times the fetcher has been invoked
  pub fn fetch_count(&self) -> u64 {
    self.fetch_count
  }

  /// Start fetching data if not already loading.
  ///
  /// This is a no-op if the query is already loading.
  pub fn fetch(&mut self) {
    if self.in_flight {
      return;
    }
    self.start_fetch();
  }

  /// Mark the data stale.
  ///
  /// Starts a fetch now, or, when one is already in flight, exactly one more
  /// fetch once it resolves. Repeated invalidations during a flight coalesce.
  pub fn invalidate(&mut self) {
    if self.in_flight {
      self.refetch_queued = true;
      return;
    }
    self.start_fetch();
  }

  /// Force a fetch now. A result from an earlier in-flight fetch is discarded
  /// when it arrives.
  pub fn refetch(&mut self) {
    self.refetch_queued = false;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    while let Ok((seq, result)) = self.rx.try_recv() {
      if seq != self.seq {
        trace!(seq, latest = self.seq, "discarding superseded query result");
        continue;
      }

      self.in_flight = false;
      changed = true;
      match result {
        Ok(data) => {
          self.state = QueryState::Success(data);
          self.previous = None;
        }
        Err(error) => {
          self.state = QueryState::Error(error);
        }
      }

      if self.refetch_queued {
        self.refetch_queued = false;
        self.start_fetch();
      }
    }

    changed
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self) {
    self.seq += 1;
    self.fetch_count += 1;
    self.in_flight = true;

    if let QueryState::Success(data) = std::mem::replace(&mut self.state, QueryState::Loading) {
      self.previous = Some(data);
    }

    let seq = self.seq;
    let tx = self.tx.clone();
    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the query may have been disposed
      let _ = tx.send((seq, result));
    });
  }
}

impl<T: fmt::Debug> fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("seq", &self.seq)
      .field("in_flight", &self.in_flight)
      .field("refetch_queued", &self.refetch_queued)
      .field("fetch_count", &self.fetch_count)
      .finish_non_exhaustive()
  }
}

/// Object-safe view of a `Query<T>` so the client can hold any `T`
trait ErasedQuery: Send {
  fn poll(&mut self) -> bool;
  fn invalidate(&mut self);
  fn as_any(&self) -> &dyn Any;
  fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Send + 'static> ErasedQuery for Query<T> {
  fn poll(&mut self) -> bool {
    Query::poll(self)
  }

  fn invalidate(&mut self) {
    Query::invalidate(self)
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

/// Shared query cache.
///
/// Owned by the application and passed by reference to whatever reads or
/// invalidates queries. Entries are created on first mount and dropped on
/// `dispose()`.
#[derive(Default)]
pub struct QueryClient {
  queries: HashMap<QueryKey, Box<dyn ErasedQuery>>,
  disposed: bool,
}

impl QueryClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a query under `key` and start its first fetch.
  ///
  /// Returns false without fetching when the key is already mounted or the
  /// client has been disposed.
  pub fn mount<T, F, Fut>(&mut self, key: QueryKey, fetcher: F) -> bool
  where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    if self.is_disposed() {
      warn!(%key, "mount on disposed query client");
      return false;
    }
    if self.queries.contains_key(&key) {
      return false;
    }

    debug!(%key, "mounting query");
    let mut query = Query::new(fetcher);
    query.fetch();
    self.queries.insert(key, Box::new(query));
    true
  }

  /// Invalidate the query under `key`. Returns false if it is not mounted.
  pub fn invalidate(&mut self, key: &QueryKey) -> bool {
    match self.queries.get_mut(key) {
      Some(query) => {
        debug!(%key, "invalidating query");
        query.invalidate();
        true
      }
      None => false,
    }
  }

  /// Apply finished fetches. Returns true if any query changed state.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    for query in self.queries.values_mut() {
      changed |= query.poll();
    }
    changed
  }

  /// Typed access to a mounted query
  pub fn query<T: 'static>(&self, key: &QueryKey) -> Option<&Query<T>> {
    self
      .queries
      .get(key)
      .and_then(|q| q.as_any().downcast_ref::<Query<T>>())
  }

  pub fn query_mut<T: 'static>(&mut self, key: &QueryKey) -> Option<&mut Query<T>> {
    self
      .queries
      .get_mut(key)
      .and_then(|q| q.as_any_mut().downcast_mut::<Query<T>>())
  }

  pub fn state<T: Send + 'static>(&self, key: &QueryKey) -> Option<&QueryState<T>> {
    self.query::<T>(key).map(|q| q.state())
  }

  pub fn data<T: Send + 'static>(&self, key: &QueryKey) -> Option<&T> {
    self.query::<T>(key).and_then(|q| q.data())
  }

  /// Drop every entry. Results still in flight are discarded.
  pub fn dispose(&mut self) {
    debug!(count = self.queries.len(), "disposing query client");
    self.queries.clear();
    self.disposed = true;
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed
  }
}

/// One-shot async write with its outcome drained on the event-loop tick.
pub struct Mutation<T, E> {
  receiver: Option<oneshot::Receiver<Result<T, E>>>,
}

impl<T, E> Default for Mutation<T, E> {
  fn default() -> Self {
    Self { receiver: None }
  }
}

impl<T: Send + 'static, E: Send + 'static> Mutation<T, E> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start the write. Any outcome still pending from an earlier call is dropped.
  pub fn mutate<Fut>(&mut self, future: Fut)
  where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
  }

  pub fn is_pending(&self) -> bool {
    self.receiver.is_some()
  }

  /// Take the outcome if the write has finished
  pub fn poll(&mut self) -> Option<Result<T, E>> {
    let receiver = self.receiver.as_mut()?;
    match receiver.try_recv() {
      Ok(outcome) => {
        self.receiver = None;
        Some(outcome)
      }
      Err(oneshot::error::TryRecvError::Empty) => None,
      Err(oneshot::error::TryRecvError::Closed) => {
        warn!("mutation task ended without an outcome");
        self.receiver = None;
        None
      }
    }
  }
}

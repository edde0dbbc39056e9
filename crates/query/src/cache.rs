use crate::{QueryError, QueryKey};
use serde::Serialize;
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tokio::sync::watch;
use tracing::{debug, warn};

type Data = Arc<dyn Any + Send + Sync>;
type Outcome = Result<Data, QueryError>;
type ErrorHandler = Arc<dyn Fn(&QueryError) + Send + Sync>;

/// Defaults applied to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    /// Refetch stale queries when the window regains focus
    pub refetch_on_window_focus: bool,
    /// How long fetched data counts as fresh
    pub stale_time: Duration,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            refetch_on_window_focus: true,
            stale_time: Duration::ZERO,
        }
    }
}

/// Cache-level hooks shared by all queries.
#[derive(Clone, Default)]
pub struct QueryCache {
    on_error: Option<ErrorHandler>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once for every failed fetch, whichever query it was.
    pub fn with_on_error(
        mut self,
        handler: impl Fn(&QueryError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    fn report(&self, error: &QueryError) {
        if let Some(handler) = &self.on_error {
            handler(error);
        }
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Idle,
    Fetching,
    Success,
    Error,
}

struct Entry {
    data: Option<Data>,
    updated_at: Option<Instant>,
    status: Status,
    error: Option<String>,
    fetches: u64,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            data: None,
            updated_at: None,
            status: Status::Idle,
            error: None,
            fetches: 0,
        }
    }
}

impl Entry {
    fn fresh(&self, stale_time: Duration) -> Option<&Data> {
        let updated_at = self.updated_at?;
        if updated_at.elapsed() < stale_time {
            self.data.as_ref()
        } else {
            None
        }
    }
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, Entry>,
    inflight: HashMap<QueryKey, watch::Receiver<Option<Outcome>>>,
}

enum Role {
    Leader(watch::Sender<Option<Outcome>>),
    Follower(watch::Receiver<Option<Outcome>>),
}

/// Keyed query runner and result cache.
pub struct QueryClient {
    defaults: QueryDefaults,
    cache: QueryCache,
    state: Mutex<State>,
}

impl QueryClient {
    pub fn new(defaults: QueryDefaults, cache: QueryCache) -> Self {
        Self {
            defaults,
            cache,
            state: Mutex::new(State::default()),
        }
    }

    pub const fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `fetcher` for `key`, or share the result of a fetch already running.
    ///
    /// Fresh cached data is returned without fetching. When the fetch fails
    /// the cache's error handler runs once and every caller gets the error.
    pub async fn fetch<T, F, Fut, E>(
        &self,
        key: QueryKey,
        fetcher: F,
    ) -> Result<T, QueryError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<eyre::Report>,
    {
        let role = {
            let mut state = self.lock();
            if let Some(data) = state
                .entries
                .get(&key)
                .and_then(|entry| entry.fresh(self.defaults.stale_time))
            {
                return downcast(&key, data);
            }

            let running = state.inflight.get(&key).cloned();
            match running {
                Some(rx) => Role::Follower(rx),
                None => {
                    let (tx, rx) = watch::channel(None);
                    state.inflight.insert(key.clone(), rx);
                    state.entries.entry(key.clone()).or_default().status = Status::Fetching;
                    Role::Leader(tx)
                }
            }
        };

        let outcome = match role {
            Role::Follower(rx) => {
                debug!(%key, "Joining in-flight query");
                join(&key, rx).await
            }
            Role::Leader(tx) => {
                let mut guard = InflightGuard {
                    client: self,
                    key: &key,
                    armed: true,
                };
                let result = fetcher().await;
                guard.armed = false;

                let outcome = self.settle(&key, result);
                tx.send_replace(Some(outcome.clone()));
                outcome
            }
        };

        downcast(&key, &outcome?)
    }

    fn settle<T, E>(&self, key: &QueryKey, result: Result<T, E>) -> Outcome
    where
        T: Send + Sync + 'static,
        E: Into<eyre::Report>,
    {
        let outcome: Outcome = match result {
            Ok(value) => Ok(Arc::new(value) as Data),
            Err(e) => {
                let report = e.into();
                Err(QueryError::Failed {
                    key: key.clone(),
                    message: report.to_string(),
                    report: Arc::new(report),
                })
            }
        };

        {
            let mut state = self.lock();
            state.inflight.remove(key);
            let entry = state.entries.entry(key.clone()).or_default();
            entry.fetches += 1;
            match &outcome {
                Ok(data) => {
                    entry.data = Some(data.clone());
                    entry.updated_at = Some(Instant::now());
                    entry.status = Status::Success;
                    entry.error = None;
                }
                Err(e) => {
                    entry.status = Status::Error;
                    entry.error = Some(e.to_string());
                }
            }
        }

        if let Err(e) = &outcome {
            warn!("{}", e);
            self.cache.report(e);
        }
        outcome
    }

    /// Last successful data for `key`, fresh or not.
    pub fn query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let state = self.lock();
        let data = state.entries.get(key)?.data.as_ref()?;
        (**data).downcast_ref::<T>().cloned()
    }

    /// Mark `key` stale so the next fetch goes to the network.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.lock().entries.get_mut(key) {
            entry.updated_at = None;
        }
    }

    /// Keys to refetch after the window regains focus.
    pub fn window_focused(&self) -> Vec<QueryKey> {
        if !self.defaults.refetch_on_window_focus {
            return Vec::new();
        }

        let state = self.lock();
        let mut keys: Vec<QueryKey> = state
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.data.is_some() && entry.fresh(self.defaults.stale_time).is_none()
            })
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// State of every known query, for the devtools panel.
    pub fn snapshot(&self) -> serde_json::Value {
        let state = self.lock();
        let mut keys: Vec<&QueryKey> = state.entries.keys().collect();
        keys.sort();

        let queries: Vec<serde_json::Value> = keys
            .into_iter()
            .map(|key| {
                let entry = &state.entries[key];
                serde_json::json!({
                    "key": key,
                    "status": entry.status,
                    "fetches": entry.fetches,
                    "stale": entry.fresh(self.defaults.stale_time).is_none(),
                    "error": entry.error,
                })
            })
            .collect();

        serde_json::json!({ "queries": queries })
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("defaults", &self.defaults)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight slot when a leading fetch is dropped midway.
struct InflightGuard<'a> {
    client: &'a QueryClient,
    key: &'a QueryKey,
    armed: bool,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.client.lock();
        state.inflight.remove(self.key);
        if let Some(entry) = state.entries.get_mut(self.key) {
            entry.status = Status::Idle;
        }
        debug!(key = %self.key, "In-flight query dropped");
    }
}

/// Wait for the leading fetch of a key to publish its outcome.
async fn join(key: &QueryKey, mut rx: watch::Receiver<Option<Outcome>>) -> Outcome {
    let settled = match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    };
    settled.unwrap_or_else(|| Err(QueryError::Cancelled(key.clone())))
}

fn downcast<T: Clone + 'static>(key: &QueryKey, data: &Data) -> Result<T, QueryError> {
    (**data)
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| QueryError::TypeMismatch(key.clone()))
}

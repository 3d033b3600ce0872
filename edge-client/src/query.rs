use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Api, Error, QueryCache, QueryData, QueryKey, Snapshot};

/// The query cache, along with the way to fill it
///
/// Cloning yields a handle to the same cache.
#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<Mutex<QueryCache>>,
    api: Arc<dyn Api>,
}

impl QueryClient {
    pub fn new(api: Arc<dyn Api>) -> QueryClient {
        QueryClient {
            cache: Arc::new(Mutex::new(QueryCache::new())),
            api,
        }
    }

    pub fn api(&self) -> &dyn Api {
        &*self.api
    }

    /// Current cached value of `key`, without fetching
    pub fn peek(&self, key: &QueryKey) -> Option<QueryData> {
        self.cache.lock().get(key).cloned()
    }

    pub fn with_cache<R>(&self, f: impl FnOnce(&QueryCache) -> R) -> R {
        f(&self.cache.lock())
    }

    /// Returns the cached value if it is fresh, fetches it otherwise
    pub async fn fetch(&self, key: QueryKey) -> Result<QueryData, Error> {
        {
            let cache = self.cache.lock();
            if !cache.is_stale(&key) {
                if let Some(data) = cache.get(&key) {
                    return Ok(data.clone());
                }
            }
        }
        self.refetch(key).await
    }

    /// Fetches `key` from the server and stores it, unless an optimistic
    /// write or a newer fetch happened in the meantime
    pub async fn refetch(&self, key: QueryKey) -> Result<QueryData, Error> {
        let ticket = self.cache.lock().start_fetch(key.clone());
        let res = match &key {
            QueryKey::Amas => self.api.fetch_amas().await.map(QueryData::Articles),
            QueryKey::Feed => self.api.fetch_feed().await.map(QueryData::Articles),
            QueryKey::Ama(slug) => self.api.fetch_thread(slug).await.map(QueryData::Thread),
        };
        let data = match res {
            Ok(data) => data,
            Err(e) => {
                self.cache.lock().fail_fetch(ticket);
                return Err(e);
            }
        };
        let mut cache = self.cache.lock();
        if cache.finish_fetch(ticket, data.clone()) {
            tracing::trace!(?key, "stored fetch result");
            return Ok(data);
        }
        tracing::debug!(?key, "discarding superseded fetch result");
        Ok(cache.get(&key).cloned().unwrap_or(data))
    }

    /// Cancels in-flight fetches of `key`, snapshots its value and writes
    /// the result of `update` to it, all under a single lock of the cache
    ///
    /// `update` returns false when the data it was given does not contain
    /// the resource to update, in which case nothing is written and `None`
    /// is returned. `None` is also returned when nothing is cached yet.
    pub fn optimistic_update(
        &self,
        key: &QueryKey,
        update: impl FnOnce(&mut QueryData) -> bool,
    ) -> Option<Snapshot> {
        let mut cache = self.cache.lock();
        let snapshot = cache.begin(key);
        let mut data = snapshot.data()?.clone();
        if !update(&mut data) {
            return None;
        }
        cache.commit(key, data);
        Some(snapshot)
    }

    pub fn rollback(&self, snapshot: Snapshot) {
        tracing::debug!(key=?snapshot.key(), "rolling back optimistic update");
        self.cache.lock().rollback(snapshot);
    }

    /// Marks `key` stale and reconciles it with the server
    ///
    /// A failed refetch leaves the last known value in place.
    pub async fn settle(&self, key: QueryKey) {
        self.cache.lock().settle(&key);
        if let Err(err) = self.refetch(key.clone()).await {
            tracing::warn!(?key, ?err, "refetch after settlement failed");
        }
    }
}

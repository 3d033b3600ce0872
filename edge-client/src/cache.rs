use std::collections::HashMap;

use crate::api::{Article, ArticleId, CommentId, Thread};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum QueryKey {
    /// The list of AMAs
    Amas,

    /// The article feed
    Feed,

    /// One AMA and its comments, by slug
    Ama(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryData {
    Articles(Vec<Article>),
    Thread(Thread),
}

impl QueryData {
    /// Returns false if the article is not part of this data
    pub fn toggle_article_like(&mut self, id: ArticleId) -> bool {
        let article = match self {
            QueryData::Articles(articles) => articles.iter_mut().find(|a| a.id == id),
            QueryData::Thread(t) => Some(&mut t.article).filter(|a| a.id == id),
        };
        match article {
            Some(a) => {
                a.toggle_like();
                true
            }
            None => false,
        }
    }

    /// Returns false if the comment is not part of this data
    pub fn toggle_comment_like(&mut self, id: CommentId) -> bool {
        let comment = match self {
            QueryData::Articles(_) => None,
            QueryData::Thread(t) => t.comments.iter_mut().find(|c| c.id == id),
        };
        match comment {
            Some(c) => {
                c.toggle_like();
                true
            }
            None => false,
        }
    }

    pub fn as_thread(&self) -> Option<&Thread> {
        match self {
            QueryData::Thread(t) => Some(t),
            QueryData::Articles(_) => None,
        }
    }

    pub fn as_articles(&self) -> Option<&[Article]> {
        match self {
            QueryData::Articles(a) => Some(a),
            QueryData::Thread(_) => None,
        }
    }
}

/// Proof that a fetch was started for a key
///
/// Only the most recently started fetch of a key may store its result, and
/// only if no optimistic write cancelled it in the meantime.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

/// The value of a key before an optimistic write, to restore on failure
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    key: QueryKey,
    data: Option<QueryData>,
}

impl Snapshot {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn data(&self) -> Option<&QueryData> {
        self.data.as_ref()
    }
}

#[derive(Debug, Default)]
struct Entry {
    data: Option<QueryData>,
    stale: bool,
    generation: u64,
    fetching: bool,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,

    /// Number of writes to any entry's data since creation
    writes: u64,
}

impl QueryCache {
    pub fn new() -> QueryCache {
        QueryCache::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&QueryData> {
        self.entries.get(key).and_then(|e| e.data.as_ref())
    }

    /// Keys never fetched count as stale
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .map(|e| e.stale || e.data.is_none())
            .unwrap_or(true)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries.get(key).map(|e| e.fetching).unwrap_or(false)
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn start_fetch(&mut self, key: QueryKey) -> FetchTicket {
        let e = self.entries.entry(key.clone()).or_default();
        e.generation += 1;
        e.fetching = true;
        FetchTicket {
            key,
            generation: e.generation,
        }
    }

    /// Stores the result of a fetch, unless it was superseded or cancelled
    ///
    /// Returns whether the data was stored.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, data: QueryData) -> bool {
        let e = self.entries.entry(ticket.key).or_default();
        if e.generation != ticket.generation {
            return false;
        }
        e.data = Some(data);
        e.stale = false;
        e.fetching = false;
        self.writes += 1;
        true
    }

    pub fn fail_fetch(&mut self, ticket: FetchTicket) {
        if let Some(e) = self.entries.get_mut(&ticket.key) {
            if e.generation == ticket.generation {
                e.fetching = false;
            }
        }
    }

    /// Makes any in-flight fetch for `key` unable to land
    pub fn cancel(&mut self, key: &QueryKey) {
        if let Some(e) = self.entries.get_mut(key) {
            if e.fetching {
                tracing::debug!(?key, "cancelling in-flight fetch");
            }
            e.generation += 1;
            e.fetching = false;
        }
    }

    pub fn invalidate(&mut self, key: &QueryKey) {
        if let Some(e) = self.entries.get_mut(key) {
            e.stale = true;
        }
    }

    /// Starts an optimistic write: cancels in-flight fetches and returns the
    /// current value to restore if the write has to be undone
    pub fn begin(&mut self, key: &QueryKey) -> Snapshot {
        self.cancel(key);
        Snapshot {
            key: key.clone(),
            data: self.get(key).cloned(),
        }
    }

    pub fn commit(&mut self, key: &QueryKey, data: QueryData) {
        let e = self.entries.entry(key.clone()).or_default();
        e.data = Some(data);
        self.writes += 1;
    }

    /// Puts back the exact value a snapshot was taken of
    pub fn rollback(&mut self, snapshot: Snapshot) {
        let e = self.entries.entry(snapshot.key).or_default();
        e.data = snapshot.data;
        self.writes += 1;
    }

    /// Marks the key as needing a refetch once a mutation settled
    pub fn settle(&mut self, key: &QueryKey) {
        self.invalidate(key);
    }
}

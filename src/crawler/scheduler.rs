//! Frontier and visited-set bookkeeping
//!
//! This module handles:
//! - The per-site FIFO frontier of URLs waiting to be fetched
//! - The run-wide visited set, keyed by normalized URL
//! - Global concurrency limiting via a semaphore

use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A URL queued for fetching, tagged with the site that discovered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Identifier of the site adapter that owns this entry
    pub site: &'static str,
}

/// One site's queue of URLs, processed in discovery order
///
/// Owned by a single site task, so it needs no locking.
#[derive(Debug)]
pub struct Frontier {
    site: &'static str,
    queue: VecDeque<QueuedUrl>,
}

impl Frontier {
    pub fn new(site: &'static str) -> Self {
        Self {
            site,
            queue: VecDeque::new(),
        }
    }

    pub fn push(&mut self, url: Url) {
        self.queue.push_back(QueuedUrl {
            url,
            site: self.site,
        });
    }

    pub fn extend<I: IntoIterator<Item = Url>>(&mut self, urls: I) {
        for url in urls {
            self.push(url);
        }
    }

    pub fn pop(&mut self) -> Option<QueuedUrl> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// URLs claimed for fetching during this run, shared by every site task
///
/// URLs are compared by their normalized form, so trivially different
/// spellings of one page (tracking parameters, trailing slash, host case)
/// are fetched once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    keys: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url`, returning false if it was already claimed
    ///
    /// The check and the insert happen under one lock, so two tasks racing
    /// on the same URL cannot both win.
    pub fn insert_if_absent(&self, url: &Url) -> bool {
        let key = Self::key(url);
        let mut keys = self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        keys.insert(key)
    }

    pub fn contains(&self, url: &Url) -> bool {
        let key = Self::key(url);
        let keys = self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys
            .lock()
            .map(|keys| keys.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(url: &Url) -> String {
        visit_key(url.as_str()).unwrap_or_else(|| url.to_string())
    }
}

/// Global cap on in-flight fetches across all sites
#[derive(Debug, Clone)]
pub struct FetchSlots {
    semaphore: Arc<Semaphore>,
}

impl FetchSlots {
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    /// Waits for a free slot; the slot is released when the permit drops
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.semaphore).acquire_owned().await.ok()
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

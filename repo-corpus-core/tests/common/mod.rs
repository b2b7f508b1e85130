#![allow(dead_code)]

use async_trait::async_trait;
use repo_corpus_core::config::{CrawlSettings, RetryPolicy};
use repo_corpus_core::contract::{EntryKind, HostApi, HostError, RepositoryEntry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn file(path: &str) -> RepositoryEntry {
    RepositoryEntry {
        name: path.rsplit('/').next().unwrap().to_string(),
        path: path.to_string(),
        kind: EntryKind::File,
        url: format!("api://contents/{path}"),
        download_url: Some(format!("raw://{path}")),
    }
}

pub fn dir(path: &str) -> RepositoryEntry {
    RepositoryEntry {
        name: path.rsplit('/').next().unwrap().to_string(),
        path: path.to_string(),
        kind: EntryKind::Dir,
        url: format!("api://contents/{path}"),
        download_url: None,
    }
}

pub fn symlink(path: &str) -> RepositoryEntry {
    RepositoryEntry {
        name: path.rsplit('/').next().unwrap().to_string(),
        path: path.to_string(),
        kind: EntryKind::Other,
        url: format!("api://contents/{path}"),
        download_url: None,
    }
}

pub fn fast_settings() -> CrawlSettings {
    CrawlSettings {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
        ..CrawlSettings::default()
    }
}

/// In-memory host keyed by listing and content references.
#[derive(Default)]
pub struct FakeHost {
    listings: HashMap<String, Result<Vec<RepositoryEntry>, HostError>>,
    raws: HashMap<String, Result<String, HostError>>,
    delays: HashMap<String, Duration>,
    /// Remaining transient (503) failures per reference before the real answer.
    transient: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(mut self, listing_ref: &str, entries: Vec<RepositoryEntry>) -> Self {
        self.listings.insert(listing_ref.to_string(), Ok(entries));
        self
    }

    pub fn failing_listing(mut self, listing_ref: &str, err: HostError) -> Self {
        self.listings.insert(listing_ref.to_string(), Err(err));
        self
    }

    /// Register content for a file entry created with [`file`].
    pub fn raw(mut self, path: &str, text: &str) -> Self {
        self.raws
            .insert(format!("raw://{path}"), Ok(text.to_string()));
        self
    }

    pub fn failing_raw(mut self, path: &str, err: HostError) -> Self {
        self.raws.insert(format!("raw://{path}"), Err(err));
        self
    }

    pub fn delay(mut self, reference: &str, delay: Duration) -> Self {
        self.delays.insert(reference.to_string(), delay);
        self
    }

    pub fn transient_failures(self, reference: &str, count: u32) -> Self {
        self.transient
            .lock()
            .unwrap()
            .insert(reference.to_string(), count);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, reference: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == reference).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, reference: &str) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(reference.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self
            .delays
            .get(reference)
            .copied()
            .unwrap_or(Duration::from_millis(2));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut transient = self.transient.lock().unwrap();
        if let Some(remaining) = transient.get_mut(reference) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(HostError::Status {
                    url: reference.to_string(),
                    status: 503,
                });
            }
        }
        Ok(())
    }
}

fn not_found(reference: &str) -> HostError {
    HostError::Status {
        url: reference.to_string(),
        status: 404,
    }
}

#[async_trait]
impl HostApi for FakeHost {
    async fn list_directory(&self, listing_ref: &str) -> Result<Vec<RepositoryEntry>, HostError> {
        self.enter(listing_ref).await?;
        self.listings
            .get(listing_ref)
            .cloned()
            .unwrap_or_else(|| Err(not_found(listing_ref)))
    }

    async fn fetch_raw(&self, content_ref: &str) -> Result<String, HostError> {
        self.enter(content_ref).await?;
        self.raws
            .get(content_ref)
            .cloned()
            .unwrap_or_else(|| Err(not_found(content_ref)))
    }
}

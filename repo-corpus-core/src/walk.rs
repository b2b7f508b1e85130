//! Recursive traversal of one repository tree into a [`Corpus`].
//!
//! The walker lists the root, short-circuits trivial repositories, then descends
//! depth-first. Children of a directory are walked concurrently and joined back by
//! position, so fragment order always equals listing order regardless of which fetch
//! finishes first. Each fetch holds one permit of the request-wide semaphore only for
//! its own duration.
//!
//! # Errors
//! - File-level failures become [`Fragment::Failed`] and never abort the walk.
//! - A failing directory listing or an over-deep tree aborts this repository with a
//!   [`WalkError`]; the aggregator turns that into a placeholder corpus.
//! - Cancellation stops all further recursion.

use std::future::Future;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::CrawlSettings;
use crate::contract::{EntryKind, HostApi, HostError, RepositoryEntry};
use crate::corpus::{Corpus, Fragment, RepositoryIdentifier, SkipReason};
use crate::extract::extract_file;
use crate::retry::{retry_host_call, FetchError};

/// The only failure that escapes a user-analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CrawlError {
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    #[error("listing {listing_ref} failed: {source}")]
    Listing {
        listing_ref: String,
        source: HostError,
    },
    #[error("directory {path} is nested deeper than {max_depth} levels")]
    DepthExceeded { path: String, max_depth: usize },
    #[error("walk cancelled")]
    Cancelled,
}

impl From<CrawlError> for WalkError {
    fn from(e: CrawlError) -> Self {
        match e {
            CrawlError::Cancelled => WalkError::Cancelled,
        }
    }
}

impl WalkError {
    fn from_listing(listing_ref: &str, e: FetchError) -> Self {
        match e {
            FetchError::Cancelled => WalkError::Cancelled,
            FetchError::Host(source) => WalkError::Listing {
                listing_ref: listing_ref.to_string(),
                source,
            },
        }
    }
}

/// Shared state for every fetch issued on behalf of one user-analysis request.
pub struct CrawlContext<'a> {
    pub host: &'a dyn HostApi,
    pub settings: &'a CrawlSettings,
    permits: Semaphore,
    cancel: CancellationToken,
}

impl<'a> CrawlContext<'a> {
    pub fn new(host: &'a dyn HostApi, settings: &'a CrawlSettings, cancel: CancellationToken) -> Self {
        Self {
            host,
            settings,
            permits: Semaphore::new(settings.max_in_flight_fetches.max(1)),
            cancel,
        }
    }

    /// Run one host call under a concurrency permit, racing cancellation.
    async fn guarded<T, Fut>(&self, call: Fut) -> Result<T, FetchError>
    where
        Fut: Future<Output = Result<T, HostError>>,
    {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(FetchError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| FetchError::Cancelled)?,
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            result = call => result.map_err(FetchError::Host),
        }
    }

    /// List a directory, retrying transient failures.
    pub async fn list_directory(&self, listing_ref: &str) -> Result<Vec<RepositoryEntry>, FetchError> {
        retry_host_call(&self.settings.retry, &self.cancel, listing_ref, || {
            self.guarded(self.host.list_directory(listing_ref))
        })
        .await
    }

    /// Fetch raw file content, retrying transient failures.
    pub async fn fetch_raw(&self, content_ref: &str) -> Result<String, FetchError> {
        retry_host_call(&self.settings.retry, &self.cancel, content_ref, || {
            self.guarded(self.host.fetch_raw(content_ref))
        })
        .await
    }
}

/// Walk one repository from its root listing reference.
pub async fn walk_repository(
    ctx: &CrawlContext<'_>,
    repository: &RepositoryIdentifier,
    root_ref: &str,
) -> Result<Corpus, WalkError> {
    let root = ctx
        .list_directory(root_ref)
        .await
        .map_err(|e| WalkError::from_listing(root_ref, e))?;

    let threshold = ctx.settings.trivial_entry_threshold;
    if root.len() <= threshold {
        info!(
            repository = %repository,
            entries = root.len(),
            threshold,
            "Repository is trivial, skipping extraction"
        );
        return Ok(Corpus::trivial(repository.clone(), threshold));
    }

    debug!(repository = %repository, entries = root.len(), "Walking repository tree");
    let fragments = walk_children(ctx, root, 0).await?;
    let corpus = Corpus::complete(repository.clone(), fragments);
    info!(
        repository = %repository,
        fragments = corpus.fragments().len(),
        failed = corpus.failed_fragments(),
        "Repository walk complete"
    );
    Ok(corpus)
}

async fn walk_children(
    ctx: &CrawlContext<'_>,
    entries: Vec<RepositoryEntry>,
    depth: usize,
) -> Result<Vec<Fragment>, WalkError> {
    let branches = entries
        .into_iter()
        .map(|entry| walk_entry(ctx, entry, depth));
    let results = try_join_all(branches).await?;
    Ok(results.into_iter().flatten().collect())
}

fn walk_entry<'a>(
    ctx: &'a CrawlContext<'a>,
    entry: RepositoryEntry,
    depth: usize,
) -> BoxFuture<'a, Result<Vec<Fragment>, WalkError>> {
    async move {
        match entry.kind {
            EntryKind::File => Ok(vec![extract_file(ctx, &entry).await?]),
            EntryKind::Dir => {
                if depth >= ctx.settings.max_depth {
                    return Err(WalkError::DepthExceeded {
                        path: entry.path,
                        max_depth: ctx.settings.max_depth,
                    });
                }
                let listing_ref = entry.url.as_str();
                let children = ctx
                    .list_directory(listing_ref)
                    .await
                    .map_err(|e| WalkError::from_listing(listing_ref, e))?;
                debug!(path = %entry.path, children = children.len(), depth, "Descending into directory");
                walk_children(ctx, children, depth + 1).await
            }
            EntryKind::Other => {
                debug!(path = %entry.path, "Skipping unsupported entry kind");
                Ok(vec![Fragment::Skipped {
                    path: entry.path,
                    reason: SkipReason::UnsupportedKind,
                }])
            }
        }
    }
    .boxed()
}

//! # contract: collaborator interfaces for the corpus builder
//!
//! This module defines the traits the crawling core talks to, and the plain data
//! types that cross those seams:
//!   - [`HostApi`]: the content-hosting API (directory listings and raw file content)
//!   - [`ProfilePages`]: the rendered profile page scraped for repository links
//!   - [`Analyzer`]: the external collaborator turning a corpus into free-text analysis
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; the mocks are exported with the default
//!   `test-export-mocks` feature so integration tests in other crates can use them.
//!
//! ## Adding New Hosts
//! - Implement [`HostApi`] and [`ProfilePages`] for the new host.
//! - Map transport failures onto [`HostError`] so retry classification keeps working.

use async_trait::async_trait;
use serde::Deserialize;

use mockall::{automock, predicate::*};

use crate::corpus::Corpus;

/// Kind of node in a repository tree, as reported by the host listing (`type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything the host adds later.
    #[serde(other)]
    Other,
}

/// One node in a repository's file tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryEntry {
    /// Base name, e.g. `main.rs`.
    pub name: String,
    /// Full path within the repository, e.g. `src/main.rs`.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// API reference for this node; for a directory it lists the children.
    pub url: String,
    /// Raw content reference; only files carry one.
    #[serde(default)]
    pub download_url: Option<String>,
}

impl RepositoryEntry {
    /// Raw content reference, valid only for files.
    pub fn content_ref(&self) -> Option<&str> {
        match self.kind {
            EntryKind::File => self.download_url.as_deref(),
            _ => None,
        }
    }
}

/// Failure talking to the host (API or profile pages).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
    #[error("unexpected response body from {url}: {message}")]
    Decode { url: String, message: String },
}

impl HostError {
    /// Rate limiting, server-side failures and transport hiccups are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            HostError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            HostError::Transport { .. } => true,
            HostError::Decode { .. } => false,
        }
    }
}

/// Failure reported by the analyzer collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analyzer request failed: {0}")]
    Request(String),
    #[error("analyzer response was malformed: {0}")]
    Response(String),
}

/// Content-hosting API: directory listings and raw file content.
///
/// Implemented by the real GitHub client and by test mocks. Implementations must be
/// cheap to share across concurrent walks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Fetch the ordered entries behind a listing reference.
    async fn list_directory(&self, listing_ref: &str) -> Result<Vec<RepositoryEntry>, HostError>;

    /// Fetch the raw text behind a content reference.
    async fn fetch_raw(&self, content_ref: &str) -> Result<String, HostError>;
}

/// Source of rendered profile pages used for repository discovery.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ProfilePages: Send + Sync {
    /// Fetch the rendered markup of a profile's repository listing page.
    async fn fetch_listing_page(&self, listing_url: &str) -> Result<String, HostError>;
}

/// External analysis collaborator: corpus plus instruction in, free text out.
///
/// No guarantee is made about corpus size; chunking or truncation is the
/// implementor's responsibility.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, corpus: &Corpus, instruction: &str) -> Result<String, AnalyzerError>;
}

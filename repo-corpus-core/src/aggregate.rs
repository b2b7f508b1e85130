//! High-level pipeline: discover → walk → aggregate → analyze for one user profile.
//!
//! # Major Types
//! - [`UserCorpusSet`]: corpora for every discovered repository, in discovery order
//! - [`RepositoryAnalysis`]: analyzer output for one repository
//!
//! # Responsibilities
//! - Builds each repository's root listing reference and walks all repositories under
//!   one request-wide fetch limit
//! - Degrades instead of failing: a broken repository becomes a placeholder corpus, a
//!   failed discovery becomes an empty set with a note, a failed analysis becomes a
//!   placeholder analysis
//! - Cancellation is the only error; partial results are dropped
//!
//! # Navigation
//! - Entrypoints: [`build_user_corpora`], [`analyze_user`]

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::config::CrawlSettings;
use crate::contract::{Analyzer, HostApi, ProfilePages};
use crate::corpus::{Corpus, RepositoryAnalysis, RepositoryIdentifier, UserCorpusSet};
use crate::discovery::discover_repositories;
use crate::retry::{retry_host_call, FetchError};
use crate::walk::{walk_repository, CrawlContext, CrawlError, WalkError};

/// Instruction handed to the analyzer together with each repository corpus.
pub const ANALYSIS_INSTRUCTION: &str = "You are a senior developer doing a code review to judge how difficult or complex this code is. \
First state the name of the project, then give a detailed report of the code: which technologies are used, \
what the difficulty level is and how complex the code is. Consider every aspect when judging the difficulty, \
such as the number of files and the programming languages used. If you cannot tell, at least give the name \
of the project found at the start of the document and say whether a lot of code is written in it.";

/// Contents API reference for a repository's root listing.
pub fn root_listing_ref(settings: &CrawlSettings, repository: &RepositoryIdentifier) -> String {
    let base = settings.api_base_url.trim_end_matches('/');
    match settings.reference.as_deref() {
        Some(reference) => format!(
            "{}/repos/{}/{}/contents/?ref={}",
            base, repository.owner, repository.name, reference
        ),
        None => format!(
            "{}/repos/{}/{}/contents/",
            base, repository.owner, repository.name
        ),
    }
}

/// Discover a profile's repositories and build one corpus per repository.
pub async fn build_user_corpora(
    host: &dyn HostApi,
    pages: &dyn ProfilePages,
    profile_ref: &str,
    settings: &CrawlSettings,
    cancel: &CancellationToken,
) -> Result<UserCorpusSet, CrawlError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("build_user_corpora", %request_id, profile = profile_ref);
    async move {
        info!("Starting corpus build");

        let discovered = retry_host_call(&settings.retry, cancel, profile_ref, || async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FetchError::Cancelled),
                result = discover_repositories(pages, profile_ref, settings) => result.map_err(FetchError::Host),
            }
        })
        .await;

        let repositories = match discovered {
            Ok(repositories) if repositories.is_empty() => {
                warn!("No repositories found on profile listing");
                return Ok(UserCorpusSet {
                    profile: profile_ref.to_string(),
                    corpora: Vec::new(),
                    discovery_note: Some(format!("No repositories found for {profile_ref}")),
                });
            }
            Ok(repositories) => repositories,
            Err(FetchError::Cancelled) => return Err(CrawlError::Cancelled),
            Err(FetchError::Host(e)) => {
                error!(error = %e, "Repository discovery failed");
                return Ok(UserCorpusSet {
                    profile: profile_ref.to_string(),
                    corpora: Vec::new(),
                    discovery_note: Some(format!("Repository discovery failed: {e}")),
                });
            }
        };

        let ctx = CrawlContext::new(host, settings, cancel.clone());
        let walks = repositories.iter().map(|repository| {
            let ctx = &ctx;
            async move {
                let root_ref = root_listing_ref(settings, repository);
                match walk_repository(ctx, repository, &root_ref).await {
                    Ok(corpus) => Ok(corpus),
                    Err(WalkError::Cancelled) => Err(CrawlError::Cancelled),
                    Err(e) => {
                        warn!(repository = %repository, error = %e, "Repository walk failed, recording placeholder");
                        Ok(Corpus::failed(repository.clone(), e.to_string()))
                    }
                }
            }
        });
        let corpora = try_join_all(walks).await?;

        info!(repositories = corpora.len(), "Corpus build complete");
        Ok(UserCorpusSet {
            profile: profile_ref.to_string(),
            corpora,
            discovery_note: None,
        })
    }
    .instrument(span)
    .await
}

/// Run the full pipeline for one profile: one analysis per discovered repository, in
/// discovery order.
pub async fn analyze_user(
    host: &dyn HostApi,
    pages: &dyn ProfilePages,
    analyzer: &dyn Analyzer,
    profile_ref: &str,
    settings: &CrawlSettings,
    cancel: &CancellationToken,
) -> Result<Vec<RepositoryAnalysis>, CrawlError> {
    let set = build_user_corpora(host, pages, profile_ref, settings, cancel).await?;
    if let Some(note) = &set.discovery_note {
        info!(profile = profile_ref, note = %note, "Nothing to analyze");
    }

    stream::iter(set.corpora.iter().map(|corpus| async move {
        let analysis = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            result = analyzer.analyze(corpus, ANALYSIS_INSTRUCTION) => result,
        };
        let analysis = match analysis {
            Ok(text) => {
                info!(repository = %corpus.repository, "Analysis complete");
                text
            }
            Err(e) => {
                warn!(repository = %corpus.repository, error = %e, "Analysis failed, recording placeholder");
                format!("Analysis of {} failed: {}", corpus.repository.name, e)
            }
        };
        Ok(RepositoryAnalysis {
            repository: corpus.repository.clone(),
            analysis,
        })
    }))
    .buffered(settings.max_in_flight_analyses.max(1))
    .try_collect()
    .await
}

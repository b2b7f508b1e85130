///
/// This module implements the CLI interface for repo-corpus: command parsing, config loading,
/// client construction and printing results.
///
/// All core business logic (discovery, crawling, extraction, aggregation) lives in the
/// [`repo-corpus-core`] crate. This module is strictly CLI glue.
///
/// ## Commands
/// - `analyze`: crawl every repository of a profile and print one analysis per repository
///   as a JSON array of strings.
/// - `corpus`: crawl every repository of a profile and print per-repository corpus summaries
///   (status, fragment counts, size, sha256) as JSON, optionally with the full documents.
///
/// Results go to stdout; logs go to stderr. Ctrl-C cancels the in-flight crawl and discards
/// partial corpora.
///
/// [`repo-corpus-core`]: ../../repo-corpus-core/
use crate::analyze::ChatAnalyzer;
use crate::github::GithubClient;
use crate::load_config::{load_config, CliConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use repo_corpus_core::aggregate::{analyze_user, build_user_corpora};
use repo_corpus_core::corpus::{CorpusStatus, UserCorpusSet};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// CLI for repo-corpus: crawl a user's repositories into corpora for LLM analysis.
#[derive(Parser)]
#[clap(
    name = "repo-corpus",
    version,
    about = "Crawl a user's repositories into per-repository text corpora for LLM analysis"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze every repository of a profile and print the analyses as a JSON array
    Analyze {
        /// Path to the YAML config file (defaults apply when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Profile URL, e.g. https://github.com/octocat
        #[clap(long)]
        profile: String,
    },
    /// Build the corpora for every repository of a profile and print a JSON summary
    Corpus {
        /// Path to the YAML config file (defaults apply when omitted)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Profile URL, e.g. https://github.com/octocat
        #[clap(long)]
        profile: String,
        /// Include every corpus document in the output
        #[clap(long)]
        full: bool,
    },
}

/// Per-repository line of the `corpus` command output.
#[derive(Debug, Serialize)]
pub struct CorpusSummary {
    pub repository: String,
    #[serde(flatten)]
    pub status: CorpusStatus,
    pub fragments: usize,
    pub failed_fragments: usize,
    pub bytes: usize,
    pub sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CorpusReport {
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_note: Option<String>,
    pub repositories: Vec<CorpusSummary>,
}

/// Summarise a corpus set; digests cover the exact corpus document bytes.
pub fn corpus_report(set: &UserCorpusSet, full: bool) -> CorpusReport {
    let repositories = set
        .corpora
        .iter()
        .map(|corpus| {
            let document = corpus.document();
            let sha256 = format!("{:x}", Sha256::digest(document.as_bytes()));
            CorpusSummary {
                repository: corpus.repository.to_string(),
                status: corpus.status.clone(),
                fragments: corpus.fragments().len(),
                failed_fragments: corpus.failed_fragments(),
                bytes: document.len(),
                sha256,
                document: full.then_some(document),
            }
        })
        .collect();
    CorpusReport {
        profile: set.profile.clone(),
        discovery_note: set.discovery_note.clone(),
        repositories,
    }
}

fn resolve_config(config: Option<PathBuf>) -> Result<CliConfig> {
    match config {
        Some(path) => load_config(path),
        None => {
            tracing::info!("No config file given, using defaults");
            Ok(CliConfig::default())
        }
    }
}

/// Cancel `token` on Ctrl-C until the returned task is aborted.
fn cancel_on_interrupt(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            token.cancel();
        }
    })
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Analyze { config, profile } => {
            let config = resolve_config(config)?;
            let settings = config.crawl_settings();
            tracing::info!(command = "analyze", profile = %profile, "Starting analysis");
            let github = GithubClient::new_from_env()
                .map_err(|e| anyhow::anyhow!("Failed to construct GitHub client: {e}"))?;
            let analyzer = ChatAnalyzer::new_from_env(&config.analyzer)
                .map_err(|e| anyhow::anyhow!("Failed to construct analyzer: {e}"))?;

            let cancel = CancellationToken::new();
            let watcher = cancel_on_interrupt(cancel.clone());
            let result =
                analyze_user(&github, &github, &analyzer, &profile, &settings, &cancel).await;
            watcher.abort();

            match result {
                Ok(analyses) => {
                    tracing::info!(command = "analyze", repositories = analyses.len(), "Analysis complete");
                    let texts: Vec<&str> = analyses.iter().map(|a| a.analysis.as_str()).collect();
                    println!("{}", serde_json::to_string_pretty(&texts)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "analyze", error = %e, "Analysis aborted");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Corpus {
            config,
            profile,
            full,
        } => {
            let config = resolve_config(config)?;
            let settings = config.crawl_settings();
            tracing::info!(command = "corpus", profile = %profile, "Starting corpus build");
            let github = GithubClient::new_from_env()
                .map_err(|e| anyhow::anyhow!("Failed to construct GitHub client: {e}"))?;

            let cancel = CancellationToken::new();
            let watcher = cancel_on_interrupt(cancel.clone());
            let result = build_user_corpora(&github, &github, &profile, &settings, &cancel).await;
            watcher.abort();

            match result {
                Ok(set) => {
                    let report = corpus_report(&set, full);
                    tracing::info!(command = "corpus", repositories = report.repositories.len(), "Corpus build complete");
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "corpus", error = %e, "Corpus build aborted");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}

/// `load_config` module: Loads a static YAML config into the crawl and analyzer settings used by the CLI.
///
/// This module is the only place where untrusted YAML is parsed and mapped to strongly-typed structs.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file; every section and key is optional and falls back to defaults
/// - Validate values the crawler cannot work with (zero concurrency, zero attempts, empty URLs)
/// - Secrets never live in the file: `GITHUB_ACCESS_TOKEN` and `OPENAI_API_KEY` come from the
///   environment and are read by the clients themselves
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.
use anyhow::Result;
use repo_corpus_core::config::{
    CrawlSettings, RetryPolicy, DEFAULT_API_BASE_URL, DEFAULT_LOW_VALUE_SUFFIXES, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_IN_FLIGHT_ANALYSES, DEFAULT_MAX_IN_FLIGHT_FETCHES, DEFAULT_REFERENCE, DEFAULT_REPOSITORY_MARKER,
    DEFAULT_TRIVIAL_ENTRY_THRESHOLD,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub host: HostSection,
    pub crawl: CrawlSection,
    pub analyzer: AnalyzerSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostSection {
    pub api_base_url: String,
    /// `null` lets the host pick each repository's default branch.
    pub reference: Option<String>,
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            reference: Some(DEFAULT_REFERENCE.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CrawlSection {
    pub trivial_entry_threshold: usize,
    pub max_depth: usize,
    pub max_in_flight_fetches: usize,
    pub low_value_suffixes: Vec<String>,
    pub repository_marker: String,
    pub retry: RetryPolicy,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            trivial_entry_threshold: DEFAULT_TRIVIAL_ENTRY_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            max_in_flight_fetches: DEFAULT_MAX_IN_FLIGHT_FETCHES,
            low_value_suffixes: DEFAULT_LOW_VALUE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            repository_marker: DEFAULT_REPOSITORY_MARKER.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalyzerSection {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Documents longer than this many characters are analysed in chunks of this size.
    pub chunk_chars: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap_chars: usize,
    /// Analyzer requests in flight per profile, independent of crawl fetches.
    pub max_in_flight: usize,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            chunk_chars: 12_000,
            chunk_overlap_chars: 200,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT_ANALYSES,
        }
    }
}

impl CliConfig {
    /// Crawl settings for the core crate.
    pub fn crawl_settings(&self) -> CrawlSettings {
        CrawlSettings {
            api_base_url: self.host.api_base_url.trim_end_matches('/').to_string(),
            reference: self.host.reference.clone(),
            trivial_entry_threshold: self.crawl.trivial_entry_threshold,
            max_depth: self.crawl.max_depth,
            max_in_flight_fetches: self.crawl.max_in_flight_fetches,
            max_in_flight_analyses: self.analyzer.max_in_flight,
            low_value_suffixes: self.crawl.low_value_suffixes.clone(),
            repository_marker: self.crawl.repository_marker.clone(),
            retry: self.crawl.retry.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.host.api_base_url.trim().is_empty() {
            anyhow::bail!("host.api_base_url must not be empty");
        }
        if self.crawl.max_in_flight_fetches == 0 {
            anyhow::bail!("crawl.max_in_flight_fetches must be at least 1");
        }
        if self.crawl.retry.max_attempts == 0 {
            anyhow::bail!("crawl.retry.max_attempts must be at least 1");
        }
        if self.crawl.repository_marker.trim().is_empty() {
            anyhow::bail!("crawl.repository_marker must not be empty");
        }
        if self.analyzer.chunk_chars == 0 {
            anyhow::bail!("analyzer.chunk_chars must be at least 1");
        }
        if self.analyzer.chunk_overlap_chars >= self.analyzer.chunk_chars {
            anyhow::bail!("analyzer.chunk_overlap_chars must be smaller than analyzer.chunk_chars");
        }
        if self.analyzer.max_in_flight == 0 {
            anyhow::bail!("analyzer.max_in_flight must be at least 1");
        }
        Ok(())
    }
}

/// Loads a static YAML config file (no secrets). An empty file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        CliConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    if let Err(e) = config.validate() {
        error!(error = %e, config_path = ?path_ref, "Config failed validation");
        return Err(e);
    }
    config.crawl_settings().trace_loaded();
    Ok(config)
}

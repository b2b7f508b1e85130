use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_REFERENCE: &str = "main";
pub const DEFAULT_TRIVIAL_ENTRY_THRESHOLD: usize = 5;
pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_IN_FLIGHT_FETCHES: usize = 8;
pub const DEFAULT_MAX_IN_FLIGHT_ANALYSES: usize = 2;
pub const DEFAULT_REPOSITORY_MARKER: &str = "name codeRepository";

/// Name suffixes whose content is not worth extracting.
pub const DEFAULT_LOW_VALUE_SUFFIXES: &[&str] = &[
    ".json",
    ".yaml",
    ".yml",
    ".gitignore",
    "LICENSE",
    ".yarn",
    ".env",
    ".watchmanconfig",
    ".prettierrc",
    ".prettierignore",
    ".pdf",
    ".ipynb",
    ".txt",
];

/// Everything that tunes a crawl. All heuristics live here rather than in the walker.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Base URL of the contents API, without trailing slash.
    pub api_base_url: String,
    /// Branch, tag or commit used for root listings. `None` lets the host pick the default branch.
    pub reference: Option<String>,
    /// Root listings with this many entries or fewer are reported as trivial.
    pub trivial_entry_threshold: usize,
    /// Directories nested deeper than this abort the repository walk.
    pub max_depth: usize,
    /// Upper bound on host fetches in flight for one request.
    pub max_in_flight_fetches: usize,
    /// Upper bound on analyzer calls in flight for one request, independent of host fetches.
    pub max_in_flight_analyses: usize,
    pub low_value_suffixes: Vec<String>,
    /// `itemprop` value marking repository links on the profile listing page.
    pub repository_marker: String,
    pub retry: RetryPolicy,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            reference: Some(DEFAULT_REFERENCE.to_string()),
            trivial_entry_threshold: DEFAULT_TRIVIAL_ENTRY_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            max_in_flight_fetches: DEFAULT_MAX_IN_FLIGHT_FETCHES,
            max_in_flight_analyses: DEFAULT_MAX_IN_FLIGHT_ANALYSES,
            low_value_suffixes: DEFAULT_LOW_VALUE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            repository_marker: DEFAULT_REPOSITORY_MARKER.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CrawlSettings {
    pub fn trace_loaded(&self) {
        info!(
            api_base_url = %self.api_base_url,
            reference = self.reference.as_deref().unwrap_or("<default branch>"),
            trivial_entry_threshold = self.trivial_entry_threshold,
            max_in_flight_fetches = self.max_in_flight_fetches,
            max_in_flight_analyses = self.max_in_flight_analyses,
            "Loaded CrawlSettings"
        );
        debug!(?self, "CrawlSettings loaded (full debug)");
    }
}

/// Bounded exponential backoff for retryable host failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): base * 2^retry, capped at max.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let millis = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

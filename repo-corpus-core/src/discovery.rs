//! Repository discovery by scraping a profile's rendered repository listing.
//!
//! The listing page is markup, not an API, so this depends on anchors carrying an
//! `itemprop` marker (`name codeRepository` on GitHub). Parsing is kept behind
//! [`discover_repositories`] so it can be swapped or mocked without touching the walker.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::CrawlSettings;
use crate::contract::{HostError, ProfilePages};
use crate::corpus::RepositoryIdentifier;

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<a\b([^>]*)>").expect("anchor regex is valid"))
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("attribute regex is valid")
    })
}

/// URL of the rendered repository listing for a profile.
pub fn profile_listing_url(profile_ref: &str) -> String {
    format!("{}?tab=repositories", profile_ref.trim().trim_end_matches('/'))
}

fn anchor_attribute<'h>(attributes: &'h str, wanted: &str) -> Option<&'h str> {
    attribute_regex().captures_iter(attributes).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(wanted) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
    })
}

/// Collect repository identifiers from every anchor whose `itemprop` equals `marker`,
/// in document order. Duplicates on the page are kept.
pub fn parse_repository_links(html: &str, marker: &str) -> Vec<RepositoryIdentifier> {
    let mut found = Vec::new();
    for anchor in anchor_regex().captures_iter(html) {
        let Some(attributes) = anchor.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if anchor_attribute(attributes, "itemprop").map(str::trim) != Some(marker) {
            continue;
        }
        let Some(href) = anchor_attribute(attributes, "href") else {
            warn!(marker, "Repository anchor without href");
            continue;
        };
        match RepositoryIdentifier::from_href(href) {
            Some(id) => {
                debug!(repository = %id, href, "Found repository link");
                found.push(id);
            }
            None => warn!(href, "Repository link is not of the form /owner/repo"),
        }
    }
    found
}

/// Fetch a profile's listing page and return its repositories in document order.
pub async fn discover_repositories(
    pages: &dyn ProfilePages,
    profile_ref: &str,
    settings: &CrawlSettings,
) -> Result<Vec<RepositoryIdentifier>, HostError> {
    let listing_url = profile_listing_url(profile_ref);
    info!(listing_url = %listing_url, "Fetching profile repository listing");
    let html = pages.fetch_listing_page(&listing_url).await?;
    let repositories = parse_repository_links(&html, &settings.repository_marker);
    info!(count = repositories.len(), "Discovered repositories");
    Ok(repositories)
}

/// Drop repeated identifiers, keeping the first occurrence.
pub fn dedupe_preserving_order(ids: Vec<RepositoryIdentifier>) -> Vec<RepositoryIdentifier> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

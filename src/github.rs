//! # GitHub integration (CLI <-> Core)
//!
//! Bridges the core's [`HostApi`] and [`ProfilePages`] traits to GitHub over HTTP:
//! - contents API listings and raw file downloads for the tree walker
//! - the rendered `?tab=repositories` profile page for repository discovery
//!
//! ## Client Usage
//! - Construct [`GithubClient`] with [`GithubClient::new_from_env`]; `GITHUB_ACCESS_TOKEN` is
//!   optional and, when set, is forwarded as a bearer credential on API and raw requests.
//! - All transport failures are mapped onto [`HostError`] so the core can classify retries.

use async_trait::async_trait;
use repo_corpus_core::contract::{HostApi, HostError, ProfilePages, RepositoryEntry};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use std::env;

const USER_AGENT: &str = concat!("repo-corpus/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";

pub struct GithubClient {
    http: Client,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, token })
    }

    pub fn new_from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();
        let token = env::var("GITHUB_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        tracing::info!(
            token_set = token.is_some(),
            "Initialized GithubClient from environment"
        );
        if token.is_none() {
            tracing::warn!("GITHUB_ACCESS_TOKEN not set, API requests are unauthenticated and heavily rate limited");
        }
        Self::new(token)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn get_text(&self, url: &str, request: RequestBuilder) -> Result<String, HostError> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = ?e, url, "Request failed before a response arrived");
            HostError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url, "Host returned non-success status");
            return Err(HostError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|e| HostError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl HostApi for GithubClient {
    async fn list_directory(&self, listing_ref: &str) -> Result<Vec<RepositoryEntry>, HostError> {
        tracing::debug!(listing_ref, "Listing directory");
        let request = self
            .authorized(self.http.get(listing_ref))
            .header(ACCEPT, GITHUB_JSON);
        let body = self.get_text(listing_ref, request).await?;
        serde_json::from_str::<Vec<RepositoryEntry>>(&body).map_err(|e| {
            tracing::error!(error = %e, listing_ref, "Listing response is not an entry array");
            HostError::Decode {
                url: listing_ref.to_string(),
                message: e.to_string(),
            }
        })
    }

    async fn fetch_raw(&self, content_ref: &str) -> Result<String, HostError> {
        tracing::debug!(content_ref, "Fetching raw content");
        let request = self.authorized(self.http.get(content_ref));
        self.get_text(content_ref, request).await
    }
}

#[async_trait]
impl ProfilePages for GithubClient {
    async fn fetch_listing_page(&self, listing_url: &str) -> Result<String, HostError> {
        tracing::debug!(listing_url, "Fetching profile listing page");
        let request = self.http.get(listing_url);
        self.get_text(listing_url, request).await
    }
}

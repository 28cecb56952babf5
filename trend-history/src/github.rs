//! GitHub REST API as a history source
//!
//! Lists the commits touching the results file and downloads each revision
//! from the raw content host. Works unauthenticated for public repositories;
//! a token raises the rate limit.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use trend_core::{TrendError, TrendResult};

use crate::source::HistorySource;

/// Base URL for the GitHub REST API
const GITHUB_API_BASE: &str = "https://api.github.com";
/// Base URL for raw file contents
const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Largest page the commits endpoint serves
const COMMITS_PER_PAGE: usize = 100;

const CLIENT_USER_AGENT: &str = concat!("election-trends/", env!("CARGO_PKG_VERSION"));

/// Entry of the commits listing (only the field we need)
#[derive(Debug, Clone, Deserialize)]
struct CommitEntry {
    sha: String,
}

/// Reads revisions of a results file from a GitHub repository
#[derive(Clone)]
pub struct GithubHistory {
    client: Client,
    api_base: String,
    raw_base: String,
    owner: String,
    repo: String,
    path: String,
    token: Option<String>,
    max_revisions: Option<usize>,
    label: String,
}

impl GithubHistory {
    /// Track `path` in `repository`, given as "owner/repo"
    pub fn new(repository: &str, path: impl Into<String>) -> TrendResult<Self> {
        let (owner, repo) = parse_repository(repository)?;
        let path = path.into();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TrendError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: GITHUB_API_BASE.to_string(),
            raw_base: GITHUB_RAW_BASE.to_string(),
            label: format!("github:{}/{}:{}", owner, repo, path),
            owner,
            repo,
            path,
            token: None,
            max_revisions: None,
        })
    }

    /// Authenticate requests with a personal access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Stop paging once this many revisions are listed
    pub fn with_max_revisions(mut self, max: usize) -> Self {
        self.max_revisions = Some(max);
        self
    }

    /// Point at a different API and raw host (GitHub Enterprise)
    pub fn with_base_urls(mut self, api_base: impl Into<String>, raw_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.raw_base = raw_base.into().trim_end_matches('/').to_string();
        self
    }

    fn commits_url(&self) -> String {
        format!("{}/repos/{}/{}/commits", self.api_base, self.owner, self.repo)
    }

    fn raw_url(&self, revision: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            self.owner,
            self.repo,
            revision,
            self.path.trim_start_matches('/')
        )
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send a request and fail on any non-success status
    async fn send(&self, request: RequestBuilder, what: &str) -> TrendResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| TrendError::network(format!("Failed to fetch {}: {}", what, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TrendError::not_found(format!("{} ({})", what, self.label)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrendError::api(format!(
                "GitHub API error ({}): {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl HistorySource for GithubHistory {
    fn name(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(repo = %self.label))]
    async fn revisions(&self) -> TrendResult<Vec<String>> {
        let mut revisions = Vec::new();
        let mut page = 1usize;
        let url = self.commits_url();

        loop {
            debug!("Fetching commits page {}", page);

            let request = self.request(&url).query(&[
                ("path", self.path.clone()),
                ("per_page", COMMITS_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let entries: Vec<CommitEntry> = self
                .send(request, "commit list")
                .await?
                .json()
                .await
                .map_err(|e| TrendError::parse(format!("Failed to parse commit list: {}", e)))?;

            let page_len = entries.len();
            revisions.extend(entries.into_iter().map(|c| c.sha));

            if let Some(max) = self.max_revisions {
                if revisions.len() >= max {
                    revisions.truncate(max);
                    break;
                }
            }
            if page_len < COMMITS_PER_PAGE {
                break;
            }
            page += 1;
        }

        debug!("Listed {} revisions of {}", revisions.len(), self.path);
        Ok(revisions)
    }

    async fn fetch(&self, revision: &str) -> TrendResult<Vec<u8>> {
        let url = self.raw_url(revision);
        let bytes = self
            .send(self.request(&url), &format!("revision {}", revision))
            .await?
            .bytes()
            .await
            .map_err(|e| TrendError::network(format!("Failed to read revision {}: {}", revision, e)))?;
        Ok(bytes.to_vec())
    }
}

/// Split "owner/repo" into its parts
fn parse_repository(repository: &str) -> TrendResult<(String, String)> {
    let trimmed = repository.trim().trim_end_matches(".git");
    match trimmed.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(TrendError::config(format!(
            "Expected GitHub repository as owner/repo, got '{}'",
            repository
        ))),
    }
}

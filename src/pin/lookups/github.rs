//! GitHub REST API tags/branches lookup

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};

use crate::config::{LISTING_MAX_PAGES, LISTING_PAGE_SIZE};
use crate::pin::error::LookupError;
use crate::pin::lookup::{GitRef, RefLookup};

/// Which listing endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Tags,
    Branches,
}

impl Listing {
    fn as_str(self) -> &'static str {
        match self {
            Listing::Tags => "tags",
            Listing::Branches => "branches",
        }
    }
}

/// Lookup implementation backed by `GET /repos/{owner}/{name}/{tags|branches}`
pub struct GitHubLookup {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubLookup {
    /// Creates a new GitHubLookup with a custom base URL and request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .user_agent("pinsha")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Authenticate requests with a bearer token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    async fn fetch_listing(
        &self,
        action: &str,
        listing: Listing,
    ) -> Result<Vec<GitRef>, LookupError> {
        let mut refs = Vec::new();

        for page in 1..=LISTING_MAX_PAGES {
            let batch = self.fetch_page(action, listing, page).await?;
            let is_last = batch.len() < LISTING_PAGE_SIZE;
            refs.extend(batch);
            if is_last {
                break;
            }
        }

        debug!(
            "Fetched {} {} for {}",
            refs.len(),
            listing.as_str(),
            action
        );
        Ok(refs)
    }

    async fn fetch_page(
        &self,
        action: &str,
        listing: Listing,
        page: usize,
    ) -> Result<Vec<GitRef>, LookupError> {
        let url = format!(
            "{}/repos/{}/{}?per_page={}&page={}",
            self.base_url,
            action,
            listing.as_str(),
            LISTING_PAGE_SIZE,
            page
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| classify(e, &url))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(action.to_string()));
        }

        if is_rate_limited(status, response.headers()) {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LookupError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(LookupError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub {} response: {}", listing.as_str(), e);
            if e.is_timeout() {
                LookupError::Timeout(url)
            } else {
                LookupError::InvalidResponse(e.to_string())
            }
        })
    }
}

fn classify(error: reqwest::Error, url: &str) -> LookupError {
    if error.is_timeout() {
        LookupError::Timeout(url.to_string())
    } else {
        LookupError::Network(error)
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0")
}

#[async_trait::async_trait]
impl RefLookup for GitHubLookup {
    async fn list_tags(&self, action: &str) -> Result<Vec<GitRef>, LookupError> {
        self.fetch_listing(action, Listing::Tags).await
    }

    async fn list_branches(&self, action: &str) -> Result<Vec<GitRef>, LookupError> {
        self.fetch_listing(action, Listing::Branches).await
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::error::classify_status;
use super::repo::GitHubRepo;
use super::types::Release;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetReleases: Send + Sync {
    /// Fetches the release list, newest first as the API orders it.
    async fn get_releases(&self, repo: &GitHubRepo) -> Result<Vec<Release>>;
    fn api_url(&self) -> &str;
}

pub struct GitHub {
    pub client: Client,
    pub api_url: String,
}

impl GitHub {
    #[tracing::instrument(skip(client, api_url))]
    pub fn new(client: Client, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { client, api_url }
    }

    /// Builds a client identifying itself with the given user agent.
    /// GitHub rejects API requests that carry no user agent.
    pub fn with_user_agent(user_agent: &str, api_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client, api_url))
    }
}

#[async_trait]
impl GetReleases for GitHub {
    #[tracing::instrument(skip(self, repo))]
    async fn get_releases(&self, repo: &GitHubRepo) -> Result<Vec<Release>> {
        GitHub::fetch_releases(repo, &self.client, &self.api_url).await
    }

    fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl GitHub {
    /// Single request, first page only.
    #[tracing::instrument(skip(client, api_url))]
    pub async fn fetch_releases(
        repo: &GitHubRepo,
        client: &Client,
        api_url: &str,
    ) -> Result<Vec<Release>> {
        let url = repo.releases_url(api_url);

        debug!("Fetching releases from {}...", url);

        let response = client
            .get(&url)
            .send()
            .await
            .context("Failed to send request to GitHub API")?;

        if let Some(error) = classify_status(response.status(), response.headers(), &url) {
            return Err(error.into());
        }

        let releases: Vec<Release> = response
            .json()
            .await
            .context("Failed to parse JSON response from GitHub API")?;

        debug!("Received {} releases for {}", releases.len(), repo);

        Ok(releases)
    }
}

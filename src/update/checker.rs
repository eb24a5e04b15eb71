use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use tokio::task::JoinHandle;

use super::feed::ReleaseFeed;
use super::status::UpdateStatus;
use crate::github::{GetReleases, GitHubRepo};
use crate::host::PluginDescriptor;

/// Looks up the release feed and logs whether the running build is current.
///
/// Every run fetches the feed again; nothing is cached between runs.
pub struct UpdateChecker {
    github: Arc<dyn GetReleases>,
    repo: GitHubRepo,
    descriptor: PluginDescriptor,
}

impl UpdateChecker {
    pub fn new(github: Arc<dyn GetReleases>, repo: GitHubRepo, descriptor: PluginDescriptor) -> Self {
        Self {
            github,
            repo,
            descriptor,
        }
    }

    pub fn repo(&self) -> &GitHubRepo {
        &self.repo
    }

    /// Fetches the feed and compares it with the running version.
    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    pub async fn check(&self) -> Result<UpdateStatus> {
        let releases = self.github.get_releases(&self.repo).await?;
        let feed = ReleaseFeed::from_releases(releases);
        Ok(UpdateStatus::evaluate(&feed, &self.descriptor.version))
    }

    /// Runs [`check`](Self::check) and logs the outcome. Failures are logged, never returned.
    pub async fn run(&self) -> Option<UpdateStatus> {
        match self.check().await {
            Ok(status) => {
                for line in status.report(&self.descriptor.name) {
                    info!("{}", line);
                }
                Some(status)
            }
            Err(e) => {
                warn!("Cannot look for updates: {:#}", e);
                None
            }
        }
    }

    /// Runs the check on its own task.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<Option<UpdateStatus>> {
        tokio::spawn(async move { self.run().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{FeedError, MockGetReleases, Release};
    use crate::update::VersionsBehind;

    fn descriptor(version: &str) -> PluginDescriptor {
        PluginDescriptor {
            name: "Announcer".to_string(),
            version: version.to_string(),
        }
    }

    fn releases(tags: &[&str]) -> Vec<Release> {
        tags.iter()
            .map(|tag| Release {
                tag_name: tag.to_string(),
                html_url: format!("https://example.com/{}", tag),
            })
            .collect()
    }

    fn checker(github: MockGetReleases, version: &str) -> Arc<UpdateChecker> {
        Arc::new(UpdateChecker::new(
            Arc::new(github),
            "owner/repo".parse().unwrap(),
            descriptor(version),
        ))
    }

    #[tokio::test]
    async fn test_check_reports_versions_behind() {
        let mut github = MockGetReleases::new();
        github
            .expect_get_releases()
            .times(1)
            .returning(|_| Ok(releases(&["v2.0", "v1.5", "v1.0"])));

        let status = checker(github, "1.5").check().await.unwrap();

        assert_eq!(
            status,
            UpdateStatus::Behind {
                current: "v1.5".to_string(),
                behind: VersionsBehind::Count(1),
                latest: "v2.0".to_string(),
                url: "https://example.com/v2.0".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_run_swallows_fetch_failure() {
        let mut github = MockGetReleases::new();
        github
            .expect_get_releases()
            .returning(|_| Err(FeedError::RateLimited.into()));

        let status = checker(github, "1.0").spawn().await.unwrap();

        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn test_run_with_empty_feed_does_not_panic() {
        let mut github = MockGetReleases::new();
        github.expect_get_releases().returning(|_| Ok(Vec::new()));

        let status = checker(github, "1.0").spawn().await.unwrap();

        assert_eq!(status, Some(UpdateStatus::NoReleases));
    }

    #[tokio::test]
    async fn test_each_run_fetches_again() {
        let mut github = MockGetReleases::new();
        github
            .expect_get_releases()
            .times(2)
            .returning(|_| Ok(releases(&["v1.0"])));

        let checker = checker(github, "1.0");
        assert_eq!(checker.run().await, Some(UpdateStatus::UpToDate));
        assert_eq!(checker.run().await, Some(UpdateStatus::UpToDate));
    }

    #[tokio::test]
    async fn test_check_against_http_feed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "v1.3.0", "html_url": "https://example.com/v1.3.0"},
                    {"tag_name": "v1.2.0", "html_url": "https://example.com/v1.2.0"}
                ]"#,
            )
            .create_async()
            .await;

        let github =
            crate::github::GitHub::with_user_agent("announcer-test", Some(server.url())).unwrap();
        let checker = UpdateChecker::new(
            Arc::new(github),
            "owner/repo".parse().unwrap(),
            descriptor("1.3.0-SNAPSHOT"),
        );

        let status = checker.run().await;

        mock.assert_async().await;
        assert_eq!(
            status,
            Some(UpdateStatus::Snapshot {
                current: "v1.3.0-SNAPSHOT".to_string(),
                latest: "v1.3.0".to_string(),
            })
        );
    }
}

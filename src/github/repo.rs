use anyhow::{Result, anyhow};
use std::str::FromStr;

/// Repository identifier in "owner/repo" form.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for GitHubRepo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(anyhow!(
                "Invalid repository format '{}'. Expected 'owner/repo'.",
                s
            ))
        } else {
            Ok(GitHubRepo {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

impl GitHubRepo {
    /// Releases endpoint for this repository under the given API root.
    pub fn releases_url(&self, api_url: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            api_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_repo_valid() {
        let repo = GitHubRepo::from_str("jpenilla/AnnouncerPlus").unwrap();
        assert_eq!(
            repo,
            GitHubRepo {
                owner: "jpenilla".to_string(),
                repo: "AnnouncerPlus".to_string()
            }
        );
        assert_eq!(repo.to_string(), "jpenilla/AnnouncerPlus");
    }

    #[test]
    fn test_parse_github_repo_invalid() {
        assert!(GitHubRepo::from_str("owner").is_err());
        assert!(GitHubRepo::from_str("owner/").is_err());
        assert!(GitHubRepo::from_str("/repo").is_err());
        assert!(GitHubRepo::from_str("a/b/c").is_err());
    }

    #[test]
    fn test_releases_url_trims_trailing_slash() {
        let repo: GitHubRepo = "owner/repo".parse().unwrap();
        assert_eq!(
            repo.releases_url("https://api.github.com/"),
            "https://api.github.com/repos/owner/repo/releases"
        );
    }
}

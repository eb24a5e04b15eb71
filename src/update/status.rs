use std::fmt;

use super::feed::ReleaseFeed;

/// Marker carried by development build versions.
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Release tags are prefixed with `v`; the running version is not.
pub fn current_version(running_version: &str) -> String {
    format!("v{}", running_version)
}

/// How far the running version trails the newest release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionsBehind {
    Count(usize),
    /// The running version is not in the feed at all.
    Many,
}

impl fmt::Display for VersionsBehind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionsBehind::Count(n) => write!(f, "{}", n),
            VersionsBehind::Many => write!(f, "many"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    /// Development builds are never reported as outdated.
    Snapshot { current: String, latest: String },
    Behind {
        current: String,
        behind: VersionsBehind,
        latest: String,
        url: String,
    },
    /// The feed lists no releases, so nothing can be compared.
    NoReleases,
}

impl UpdateStatus {
    /// Compares the running version (without its `v` prefix) against the feed.
    pub fn evaluate(feed: &ReleaseFeed, running_version: &str) -> Self {
        let Some((latest, url)) = feed.latest() else {
            return UpdateStatus::NoReleases;
        };

        let current = current_version(running_version);

        if latest == current {
            return UpdateStatus::UpToDate;
        }

        if current.contains(SNAPSHOT_MARKER) {
            return UpdateStatus::Snapshot {
                current,
                latest: latest.to_string(),
            };
        }

        let behind = match feed.position(&current) {
            Some(index) => VersionsBehind::Count(index),
            None => VersionsBehind::Many,
        };

        UpdateStatus::Behind {
            current,
            behind,
            latest: latest.to_string(),
            url: url.to_string(),
        }
    }

    /// Log lines describing this status. Empty when up to date.
    pub fn report(&self, plugin_name: &str) -> Vec<String> {
        match self {
            UpdateStatus::UpToDate => Vec::new(),
            UpdateStatus::Snapshot { current, latest } => vec![
                format!(
                    "You are running a development build of {}! ({})",
                    plugin_name, current
                ),
                format!("The latest official release is {}", latest),
            ],
            UpdateStatus::Behind {
                current,
                behind,
                latest,
                url,
            } => vec![
                format!("There is an update available for {}!", plugin_name),
                format!(
                    "You are running version {}, which is {} versions outdated.",
                    current, behind
                ),
                format!(
                    "Download the latest version, {} from GitHub at the link below:",
                    latest
                ),
                url.clone(),
            ],
            UpdateStatus::NoReleases => vec![format!(
                "No releases of {} are published yet, skipping the update check.",
                plugin_name
            )],
        }
    }

    pub fn is_update_available(&self) -> bool {
        matches!(self, UpdateStatus::Behind { .. })
    }
}

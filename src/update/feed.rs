use indexmap::IndexMap;

use crate::github::Release;

/// Release tags mapped to their page urls, in the order the API returned them.
///
/// A tag listed twice keeps its first position and takes the url of the
/// last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFeed {
    releases: IndexMap<String, String>,
}

impl ReleaseFeed {
    pub fn from_releases<I>(releases: I) -> Self
    where
        I: IntoIterator<Item = Release>,
    {
        releases.into_iter().collect()
    }

    /// Tags, newest first.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.releases.keys().map(String::as_str)
    }

    /// The first tag of the feed and its url.
    pub fn latest(&self) -> Option<(&str, &str)> {
        self.releases
            .get_index(0)
            .map(|(tag, url)| (tag.as_str(), url.as_str()))
    }

    pub fn position(&self, tag: &str) -> Option<usize> {
        self.releases.get_index_of(tag)
    }

    pub fn url(&self, tag: &str) -> Option<&str> {
        self.releases.get(tag).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl FromIterator<Release> for ReleaseFeed {
    fn from_iter<T: IntoIterator<Item = Release>>(iter: T) -> Self {
        let mut releases = IndexMap::new();
        for release in iter {
            releases.insert(release.tag_name, release.html_url);
        }
        Self { releases }
    }
}

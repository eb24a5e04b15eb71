use serde::{Deserialize, Serialize};

/// A published release as listed by the releases endpoint.
///
/// Only the fields the update check needs are kept; everything else in the
/// payload is ignored.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct Release {
    pub tag_name: String,
    pub html_url: String,
}

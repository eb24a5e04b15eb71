//! Update check against the project's release feed.
//!
//! - `feed` - insertion-ordered tag to url mapping built from the releases endpoint
//! - `status` - comparison of the running version against the feed
//! - `checker` - fetch, evaluate and log on a background task

mod checker;
mod feed;
mod status;

pub use checker::UpdateChecker;
pub use feed::ReleaseFeed;
pub use status::{SNAPSHOT_MARKER, UpdateStatus, VersionsBehind, current_version};

use snafu::ResultExt as _;
use tracing::{debug, info};

use super::{CheckResult, FetchReposSnafu, PublishSnafu};
use crate::dedup::already_announced;
use crate::model::Post;
use crate::source::{RepoSource, Timeline};
use crate::status;

pub const LOG_TARGET: &str = "starpocket::stars";

/// Announce starred repos newer than the newest one already announced.
///
/// Repos are walked in source order (newest star first) and the walk stops
/// at the first repo found in `posts`. Everything after it is assumed to be
/// announced as well, even if it is not in the window.
///
/// Returns the number of statuses published.
pub async fn check_stars(
    repos: &dyn RepoSource,
    timeline: &dyn Timeline,
    posts: &[Post],
) -> CheckResult<usize> {
    let starred = repos.list_starred().await.context(FetchReposSnafu)?;

    let mut published = 0;
    for repo in &starred {
        let url = repo.canonical_url();
        if already_announced(posts, url) {
            debug!(target: LOG_TARGET, %url, "Caught up with announced stars");
            break;
        }

        info!(target: LOG_TARGET, %url, "Announcing starred repo");
        let id = timeline
            .publish(&status::starred_repo(repo))
            .await
            .context(PublishSnafu { item: url })?;
        debug!(target: LOG_TARGET, %url, %id, "Published");
        published += 1;
    }

    Ok(published)
}

use snafu::ResultExt as _;
use tracing::{debug, info};

use super::{CheckResult, FetchArticlesSnafu, PublishSnafu};
use crate::dedup::find_watermark;
use crate::model::Post;
use crate::source::{ArticleSource, Timeline};
use crate::status::{self, POCKETED_MARKER};

pub const LOG_TARGET: &str = "starpocket::articles";

/// Announce articles archived since the last article announcement.
///
/// Without a previous announcement in `posts` only the first fetched article
/// is announced, which then serves as the watermark for the next cycle
/// instead of announcing the whole backlog.
///
/// Returns the number of statuses published.
pub async fn check_articles(
    articles: &dyn ArticleSource,
    timeline: &dyn Timeline,
    posts: &[Post],
) -> CheckResult<usize> {
    let watermark = find_watermark(posts, POCKETED_MARKER);
    debug!(target: LOG_TARGET, ?watermark, "Article watermark");

    let archived = articles
        .list_archived(watermark.since())
        .await
        .context(FetchArticlesSnafu)?;

    let limit = if watermark.is_found() {
        archived.len()
    } else {
        if 1 < archived.len() {
            debug!(
                target: LOG_TARGET,
                skipped = archived.len() - 1,
                "No previous announcement, announcing only the newest article"
            );
        }
        1
    };

    let mut published = 0;
    for article in archived.iter().take(limit) {
        info!(target: LOG_TARGET, title = %article.title, url = %article.url, "Announcing article");
        let id = timeline
            .publish(&status::pocketed_article(article))
            .await
            .context(PublishSnafu {
                item: article.url.as_str(),
            })?;
        debug!(target: LOG_TARGET, url = %article.url, %id, "Published");
        published += 1;
    }

    Ok(published)
}

use std::fmt;

use snafu::{ResultExt as _, Snafu};
use tracing::{debug, error, info, warn};

use crate::check::CheckError;
use crate::check::articles::check_articles;
use crate::check::stars::check_stars;
use crate::config::DEFAULT_RECENT_POSTS_LIMIT;
use crate::error::FmtChain as _;
use crate::schedule::Ticker;
use crate::source::{ArticleSource, RepoSource, SourceError, Timeline};

pub const LOG_TARGET: &str = "starpocket::cycle";

#[derive(Debug, Snafu)]
pub enum CycleError {
    #[snafu(display("Failed to fetch recent posts"))]
    FetchPosts { source: SourceError },
    #[snafu(display("Announcing stars failed"))]
    Stars { source: CheckError },
    #[snafu(display("Announcing articles failed"))]
    Articles { source: CheckError },
}

pub type CycleResult<T> = std::result::Result<T, CycleError>;

/// What a cycle published
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub starred_posted: usize,
    pub articles_posted: usize,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stars, {} articles",
            self.starred_posted, self.articles_posted
        )
    }
}

/// Runs the announce passes against one snapshot of the timeline
pub struct Bot {
    timeline: Box<dyn Timeline>,
    repos: Option<Box<dyn RepoSource>>,
    articles: Option<Box<dyn ArticleSource>>,
    recent_posts_limit: usize,
}

#[bon::bon]
impl Bot {
    #[builder(finish_fn(name = "build"))]
    pub fn new(
        timeline: Box<dyn Timeline>,
        repos: Option<Box<dyn RepoSource>>,
        articles: Option<Box<dyn ArticleSource>>,
        #[builder(default = DEFAULT_RECENT_POSTS_LIMIT)] recent_posts_limit: usize,
    ) -> Self {
        if repos.is_none() {
            warn!(target: LOG_TARGET, "No GitHub credentials, not announcing stars");
        }
        if articles.is_none() {
            warn!(target: LOG_TARGET, "No Pocket credentials, not announcing articles");
        }

        Self {
            timeline,
            repos,
            articles,
            recent_posts_limit,
        }
    }

    /// Fetch the recent posts once, then announce stars and articles
    /// against them.
    pub async fn run_cycle(&self) -> CycleResult<CycleReport> {
        info!(target: LOG_TARGET, "Starting cycle");

        let posts = self
            .timeline
            .recent_posts(self.recent_posts_limit)
            .await
            .context(FetchPostsSnafu)?;
        debug!(target: LOG_TARGET, count = posts.len(), "Scanning recent posts");

        let mut report = CycleReport::default();

        if let Some(repos) = &self.repos {
            report.starred_posted = check_stars(repos.as_ref(), self.timeline.as_ref(), &posts)
                .await
                .context(StarsSnafu)?;
        }

        if let Some(articles) = &self.articles {
            report.articles_posted =
                check_articles(articles.as_ref(), self.timeline.as_ref(), &posts)
                    .await
                    .context(ArticlesSnafu)?;
        }

        info!(target: LOG_TARGET, %report, "Finished cycle");
        Ok(report)
    }

    /// Run a cycle on every tick until the ticker stops.
    ///
    /// A failed cycle is logged and the next tick runs as usual.
    pub async fn run_scheduled(&self, ticker: &mut dyn Ticker) {
        while ticker.tick().await.is_continue() {
            if let Err(err) = self.run_cycle().await {
                error!(target: LOG_TARGET, err = %err.fmt_chain(), "Cycle failed");
            }
        }
    }
}

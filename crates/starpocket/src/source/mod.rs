//! Upstream services: where starred repos and articles come from, and the
//! timeline announcements go to.

pub mod github;
pub mod mastodon;
pub mod pocket;

use serde::de::DeserializeOwned;
use snafu::{ResultExt, Snafu};
use time::OffsetDateTime;
use tracing::warn;
use url::Url;

use crate::model::{Article, Post, StarredRepo};

pub const LOG_TARGET: &str = "starpocket::source";

/// Id returned by [`DryRunTimeline::publish`]
pub const DRY_RUN_POST_ID: &str = "dry-run";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SourceError {
    #[snafu(display("{service} request failed"))]
    Http {
        service: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("{service} responded with {status}: {body}"))]
    UnexpectedStatus {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("Failed to decode {service} response"))]
    Decode {
        service: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("Invalid {service} endpoint {path}"))]
    Endpoint {
        service: &'static str,
        path: String,
        source: url::ParseError,
    },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[async_trait::async_trait]
pub trait RepoSource: Send + Sync {
    /// Starred repositories, most recently starred first
    async fn list_starred(&self) -> SourceResult<Vec<StarredRepo>>;
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Archived articles changed at or after `since` (all of them if `None`)
    async fn list_archived(&self, since: Option<OffsetDateTime>) -> SourceResult<Vec<Article>>;
}

#[async_trait::async_trait]
pub trait Timeline: Send + Sync {
    /// Up to `limit` of the account's most recent posts, newest first
    async fn recent_posts(&self, limit: usize) -> SourceResult<Vec<Post>>;

    /// Publish a status, returning its id
    async fn publish(&self, text: &str) -> SourceResult<String>;
}

/// Reads through to the wrapped timeline, but only logs what would be
/// published.
pub struct DryRunTimeline<T> {
    inner: T,
}

impl<T> DryRunTimeline<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<T> Timeline for DryRunTimeline<T>
where
    T: Timeline,
{
    async fn recent_posts(&self, limit: usize) -> SourceResult<Vec<Post>> {
        self.inner.recent_posts(limit).await
    }

    async fn publish(&self, text: &str) -> SourceResult<String> {
        warn!(target: LOG_TARGET, %text, "Dry run, not publishing");
        Ok(DRY_RUN_POST_ID.to_owned())
    }
}

pub(crate) fn endpoint(service: &'static str, base: &Url, path: &str) -> SourceResult<Url> {
    base.join(path).context(EndpointSnafu { service, path })
}

/// Check the status and decode a JSON body, keeping the body around for
/// error reporting.
pub(crate) async fn read_json<T>(
    service: &'static str,
    response: reqwest::Response,
) -> SourceResult<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await.context(HttpSnafu { service })?;

    if !status.is_success() {
        return UnexpectedStatusSnafu {
            service,
            status: status.as_u16(),
            body,
        }
        .fail();
    }

    serde_json::from_str(&body).context(DecodeSnafu { service })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use time::macros::datetime;

    use super::*;

    struct FixedTimeline {
        published: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Timeline for FixedTimeline {
        async fn recent_posts(&self, _limit: usize) -> SourceResult<Vec<Post>> {
            Ok(vec![Post {
                id: "1".into(),
                content: "hi".into(),
                created_at: datetime!(2024-01-01 0:00 UTC),
                is_reshare: false,
                is_reply: false,
            }])
        }

        async fn publish(&self, text: &str) -> SourceResult<String> {
            self.published.lock().expect("not poisoned").push(text.into());
            Ok("real".into())
        }
    }

    #[tokio::test]
    async fn dry_run_reads_through_but_does_not_publish() {
        let timeline = DryRunTimeline::new(FixedTimeline {
            published: Mutex::new(vec![]),
        });

        assert_eq!(timeline.recent_posts(10).await.unwrap().len(), 1);
        assert_eq!(timeline.publish("text").await.unwrap(), DRY_RUN_POST_ID);
        assert!(timeline.inner.published.lock().unwrap().is_empty());
    }

    #[test]
    fn endpoint_joins_onto_origin() {
        let base = Url::parse("https://api.github.com").unwrap();
        assert_eq!(
            endpoint("GitHub", &base, "user/starred").unwrap().as_str(),
            "https://api.github.com/user/starred"
        );
    }
}

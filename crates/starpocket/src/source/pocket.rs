use std::collections::BTreeMap;

use reqwest::Client;
use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use snafu::ResultExt as _;
use time::OffsetDateTime;
use tracing::debug;
use url::Url;

use super::{ArticleSource, HttpSnafu, LOG_TARGET, SourceResult, endpoint, read_json};
use crate::model::Article;

const SERVICE: &str = "Pocket";

pub const DEFAULT_API_URL: &str = "https://getpocket.com";

#[derive(Debug, Serialize)]
struct GetRequest<'a> {
    consumer_key: &'a str,
    access_token: &'a str,
    state: &'static str,
    #[serde(rename = "detailType")]
    detail_type: &'static str,
    sort: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default, deserialize_with = "de_item_list")]
    list: BTreeMap<String, PocketItem>,
}

#[derive(Debug, Deserialize)]
struct PocketItem {
    #[serde(default)]
    resolved_title: String,
    #[serde(default)]
    given_title: String,
    #[serde(default)]
    given_url: String,
    #[serde(default)]
    resolved_url: String,
    #[serde(default, deserialize_with = "de_unix_secs")]
    time_added: i64,
    #[serde(default, deserialize_with = "de_unix_secs")]
    time_updated: i64,
    #[serde(default, deserialize_with = "de_unix_secs")]
    time_read: i64,
    #[serde(default, deserialize_with = "de_unix_secs")]
    sort_id: i64,
    #[serde(default)]
    tags: BTreeMap<String, IgnoredAny>,
}

impl PocketItem {
    fn archived_at(&self) -> OffsetDateTime {
        [self.time_read, self.time_updated, self.time_added]
            .into_iter()
            .find(|secs| *secs != 0)
            .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

impl From<PocketItem> for Article {
    fn from(item: PocketItem) -> Self {
        let archived_at = item.archived_at();
        let title = if item.resolved_title.is_empty() {
            item.given_title
        } else {
            item.resolved_title
        };
        let url = if item.given_url.is_empty() {
            item.resolved_url
        } else {
            item.given_url
        };

        Article {
            title,
            url,
            tags: item.tags.into_keys().collect(),
            archived_at,
        }
    }
}

/// Pocket sends `[]` instead of `{}` when nothing matched
fn de_item_list<'de, D>(deserializer: D) -> Result<BTreeMap<String, PocketItem>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::Array(items) if items.is_empty() => Ok(BTreeMap::new()),
        list @ Value::Object(_) => BTreeMap::deserialize(list).map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "expected an object of items, got {other}"
        ))),
    }
}

/// Numbers arrive either as JSON numbers or as numeric strings
fn de_unix_secs<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) if s.is_empty() => Ok(0),
        Raw::Str(s) => s.parse().map_err(de::Error::custom),
    }
}

/// Archived items of a Pocket account
pub struct PocketArchive {
    client: Client,
    api_url: Url,
    consumer_key: String,
    access_token: String,
}

impl PocketArchive {
    pub fn new(client: Client, api_url: Url, consumer_key: String, access_token: String) -> Self {
        Self {
            client,
            api_url,
            consumer_key,
            access_token,
        }
    }
}

#[async_trait::async_trait]
impl ArticleSource for PocketArchive {
    async fn list_archived(&self, since: Option<OffsetDateTime>) -> SourceResult<Vec<Article>> {
        let url = endpoint(SERVICE, &self.api_url, "v3/get")?;
        let body = GetRequest {
            consumer_key: &self.consumer_key,
            access_token: &self.access_token,
            state: "archive",
            detail_type: "complete",
            sort: "newest",
            since: since.map(OffsetDateTime::unix_timestamp),
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .context(HttpSnafu { service: SERVICE })?;
        let response: GetResponse = read_json(SERVICE, response).await?;

        let mut items: Vec<PocketItem> = response.list.into_values().collect();
        items.sort_by_key(|item| item.sort_id);

        debug!(target: LOG_TARGET, count = items.len(), ?since, "Fetched archived articles");
        Ok(items.into_iter().map(Article::from).collect())
    }
}

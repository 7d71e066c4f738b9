use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use snafu::ResultExt as _;
use tracing::debug;
use url::Url;

use super::{HttpSnafu, LOG_TARGET, RepoSource, SourceResult, endpoint, read_json};
use crate::model::StarredRepo;

const SERVICE: &str = "GitHub";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Only the newest page is needed: listing stops at the first announced repo
pub const STARRED_PAGE_SIZE: u32 = 25;

#[derive(Debug, Deserialize)]
struct GithubRepo {
    html_url: String,
    description: Option<String>,
    license: Option<GithubLicense>,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GithubLicense {
    key: String,
}

impl From<GithubRepo> for StarredRepo {
    fn from(repo: GithubRepo) -> Self {
        StarredRepo {
            html_url: repo.html_url,
            description: repo.description.unwrap_or_default(),
            license_key: repo.license.map(|license| license.key),
            language: repo.language,
            topics: repo.topics,
        }
    }
}

/// Starred repositories of the token owner, or of `username` if given
pub struct GithubStars {
    client: Client,
    api_url: Url,
    token: Option<String>,
    username: Option<String>,
}

impl GithubStars {
    pub fn new(
        client: Client,
        api_url: Url,
        token: Option<String>,
        username: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url,
            token,
            username,
        }
    }

    fn starred_path(&self) -> String {
        match &self.username {
            Some(username) => format!("users/{username}/starred"),
            None => "user/starred".to_owned(),
        }
    }
}

#[async_trait::async_trait]
impl RepoSource for GithubStars {
    async fn list_starred(&self) -> SourceResult<Vec<StarredRepo>> {
        let url = endpoint(SERVICE, &self.api_url, &self.starred_path())?;

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .query(&[("per_page", STARRED_PAGE_SIZE)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context(HttpSnafu { service: SERVICE })?;
        let repos: Vec<GithubRepo> = read_json(SERVICE, response).await?;

        debug!(target: LOG_TARGET, count = repos.len(), "Fetched starred repos");
        Ok(repos.into_iter().map(StarredRepo::from).collect())
    }
}

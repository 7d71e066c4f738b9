use reqwest::Client;
use serde::Deserialize;
use snafu::ResultExt as _;
use time::OffsetDateTime;
use tracing::{debug, info};
use url::Url;

use super::{HttpSnafu, LOG_TARGET, SourceResult, Timeline, endpoint, read_json};
use crate::config::MastodonCredentials;
use crate::model::Post;

const SERVICE: &str = "Mastodon";

pub const DEFAULT_SERVER: &str = "https://mastodon.social";

/// Largest `limit` the statuses endpoint accepts
pub const MAX_STATUSES_PAGE: usize = 40;

const OAUTH_SCOPES: &str = "read write";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    acct: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    #[serde(default)]
    content: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(default)]
    reblog: Option<serde_json::Value>,
    #[serde(default)]
    in_reply_to_id: Option<String>,
}

impl From<Status> for Post {
    fn from(status: Status) -> Self {
        Post {
            id: status.id,
            content: status.content,
            created_at: status.created_at,
            is_reshare: status.reblog.is_some(),
            is_reply: status.in_reply_to_id.is_some(),
        }
    }
}

/// An authenticated Mastodon account
pub struct MastodonClient {
    client: Client,
    server: Url,
    access_token: String,
    account_id: String,
}

impl MastodonClient {
    /// Authenticate and resolve the account the credentials belong to.
    pub async fn connect(
        client: Client,
        server: Url,
        credentials: &MastodonCredentials,
    ) -> SourceResult<Self> {
        let access_token = match credentials {
            MastodonCredentials::AccessToken(token) => token.clone(),
            MastodonCredentials::Password {
                client_id,
                client_secret,
                username,
                password,
            } => {
                let url = endpoint(SERVICE, &server, "oauth/token")?;
                let response = client
                    .post(url)
                    .form(&[
                        ("grant_type", "password"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("username", username.as_str()),
                        ("password", password.as_str()),
                        ("scope", OAUTH_SCOPES),
                    ])
                    .send()
                    .await
                    .context(HttpSnafu { service: SERVICE })?;
                let token: TokenResponse = read_json(SERVICE, response).await?;
                token.access_token
            }
        };

        let url = endpoint(SERVICE, &server, "api/v1/accounts/verify_credentials")?;
        let response = client
            .get(url)
            .bearer_auth(&access_token)
            .send()
            .await
            .context(HttpSnafu { service: SERVICE })?;
        let account: Account = read_json(SERVICE, response).await?;

        info!(target: LOG_TARGET, acct = %account.acct, id = %account.id, "Authenticated to Mastodon");

        Ok(Self {
            client,
            server,
            access_token,
            account_id: account.id,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

#[async_trait::async_trait]
impl Timeline for MastodonClient {
    async fn recent_posts(&self, limit: usize) -> SourceResult<Vec<Post>> {
        let url = endpoint(
            SERVICE,
            &self.server,
            &format!("api/v1/accounts/{}/statuses", self.account_id),
        )?;

        let mut posts = Vec::with_capacity(limit.min(MAX_STATUSES_PAGE));
        let mut max_id: Option<String> = None;

        while posts.len() < limit {
            let remaining = limit - posts.len();
            let page_size = remaining.min(MAX_STATUSES_PAGE);

            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(&[("limit", page_size.to_string())]);
            if let Some(max_id) = &max_id {
                request = request.query(&[("max_id", max_id)]);
            }

            let response = request.send().await.context(HttpSnafu { service: SERVICE })?;
            let page: Vec<Status> = read_json(SERVICE, response).await?;

            let Some(last) = page.last() else {
                break;
            };
            max_id = Some(last.id.clone());
            let exhausted = page.len() < page_size;

            posts.extend(page.into_iter().take(remaining).map(Post::from));

            if exhausted {
                break;
            }
        }

        debug!(target: LOG_TARGET, count = posts.len(), limit, "Fetched recent posts");
        Ok(posts)
    }

    async fn publish(&self, text: &str) -> SourceResult<String> {
        let url = endpoint(SERVICE, &self.server, "api/v1/statuses")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .form(&[("status", text)])
            .send()
            .await
            .context(HttpSnafu { service: SERVICE })?;
        let status: Status = read_json(SERVICE, response).await?;

        Ok(status.id)
    }
}

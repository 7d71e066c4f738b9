use std::path::PathBuf;

use clap::{Args, Parser};

/// Announces new GitHub stars and archived Pocket articles on Mastodon
///
/// Every option can also be set in the config file; command line and
/// environment take precedence over it.
#[derive(Debug, Default, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// Path to a TOML config file
    #[arg(long, env = "STARPOCKET_CONFIG")]
    pub config: Option<PathBuf>,

    /// How often to check, e.g. `30m` or `1h30m`; run once if unset
    #[arg(long, env = "FREQUENCY")]
    pub frequency: Option<String>,

    /// How many recent posts to scan for previous announcements
    #[arg(long, env = "RECENT_POSTS_LIMIT")]
    pub recent_posts_limit: Option<usize>,

    /// Log statuses instead of publishing them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub github: GithubOpts,

    #[command(flatten)]
    pub pocket: PocketOpts,

    #[command(flatten)]
    pub mastodon: MastodonOpts,
}

#[derive(Debug, Default, Args)]
pub struct GithubOpts {
    /// GitHub token; lists the token owner's stars
    #[arg(long, env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// List this user's stars instead of the token owner's
    #[arg(long, env = "GITHUB_USERNAME")]
    pub github_username: Option<String>,

    #[arg(long, env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,
}

#[derive(Debug, Default, Args)]
pub struct PocketOpts {
    /// Pocket consumer key
    #[arg(long, env = "POCKET_KEY")]
    pub pocket_key: Option<String>,

    /// Pocket access token
    #[arg(long, env = "POCKET_TOKEN")]
    pub pocket_token: Option<String>,

    #[arg(long, env = "POCKET_API_URL")]
    pub pocket_api_url: Option<String>,
}

#[derive(Debug, Default, Args)]
pub struct MastodonOpts {
    /// Mastodon instance to post to
    #[arg(long, env = "MASTODON_SERVER")]
    pub mastodon_server: Option<String>,

    #[arg(long, env = "MASTODON_CLIENT_ID")]
    pub mastodon_client_id: Option<String>,

    #[arg(long, env = "MASTODON_CLIENT_SECRET")]
    pub mastodon_client_secret: Option<String>,

    #[arg(long, env = "MASTODON_USERNAME")]
    pub mastodon_username: Option<String>,

    #[arg(long, env = "MASTODON_PASSWORD")]
    pub mastodon_password: Option<String>,

    /// Use this token instead of logging in with the password grant
    #[arg(long, env = "MASTODON_ACCESS_TOKEN")]
    pub mastodon_access_token: Option<String>,
}

//! Configuration layering.
//!
//! Values come from the command line (or its environment fallbacks), then
//! the config file, then built-in defaults. The result is validated once into
//! an immutable [`Config`].

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use serde::Deserialize;
use snafu::{ResultExt as _, Snafu, ensure};
use tracing::debug;
use url::Url;

use crate::cli::Opts;
use crate::duration::{FrequencyParseError, parse_frequency};
use crate::source::{github, mastodon, pocket};

pub const LOG_TARGET: &str = "starpocket::config";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Enough to cover a few days of activity for most accounts
pub const DEFAULT_RECENT_POSTS_LIMIT: usize = 40;

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read config file {}", path.display()))]
    ReadFile { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to parse config file {}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[snafu(display("--{flag} or {env} must be set"))]
    MissingCredential {
        flag: &'static str,
        env: &'static str,
    },
    #[snafu(display("Invalid frequency"))]
    Frequency { source: FrequencyParseError },
    #[snafu(display("Invalid URL for {field}: {value}"))]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[snafu(display("recent-posts-limit must be at least 1"))]
    ZeroPostsLimit,
    #[snafu(display(
        "Nothing to announce: configure a GitHub token or username, or a Pocket key and token"
    ))]
    NoSourceEnabled,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Contents of the config file, every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    pub frequency: Option<String>,
    pub recent_posts_limit: Option<usize>,
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub pocket: PocketSection,
    #[serde(default)]
    pub mastodon: MastodonSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GithubSection {
    pub token: Option<String>,
    pub username: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PocketSection {
    pub key: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MastodonSection {
    pub server: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
}

impl FileConfig {
    pub fn read(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).context(ReadFileSnafu { path })?;
        toml::from_str(&content).context(ParseFileSnafu { path })
    }

    /// Read `explicit` if given, otherwise the first default location that
    /// exists. No file at all is fine.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        for path in default_config_paths() {
            if path.is_file() {
                debug!(target: LOG_TARGET, path = %path.display(), "Using config file");
                return Self::read(&path);
            }
        }

        debug!(target: LOG_TARGET, "No config file found");
        Ok(Self::default())
    }
}

/// `/config.toml`, `~/.pocket/config.toml`, `./config.toml`, in that order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new("/").join(CONFIG_FILE_NAME)];
    if let Some(dirs) = directories::BaseDirs::new() {
        paths.push(dirs.home_dir().join(".pocket").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MastodonCredentials {
    AccessToken(String),
    /// OAuth password grant
    Password {
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MastodonConfig {
    pub server: Url,
    pub credentials: MastodonCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub api_url: Url,
    pub token: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PocketConfig {
    pub api_url: Url,
    pub consumer_key: String,
    pub access_token: String,
}

/// Validated settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mastodon: MastodonConfig,
    /// `None` disables announcing stars
    pub github: Option<GithubConfig>,
    /// `None` disables announcing articles
    pub pocket: Option<PocketConfig>,
    /// `None` means a single run
    pub frequency: Option<Duration>,
    pub recent_posts_limit: usize,
    pub dry_run: bool,
}

impl Config {
    pub fn load(opts: &Opts) -> ConfigResult<Self> {
        let file = FileConfig::discover(opts.config.as_deref())?;
        Self::from_layers(opts, file)
    }

    pub fn from_layers(opts: &Opts, file: FileConfig) -> ConfigResult<Self> {
        let mastodon = {
            let opts = &opts.mastodon;
            let file = file.mastodon;

            let server = parse_url(
                "mastodon-server",
                layer(&opts.mastodon_server, file.server),
                mastodon::DEFAULT_SERVER,
            )?;

            let credentials = match layer(&opts.mastodon_access_token, file.access_token) {
                Some(token) => MastodonCredentials::AccessToken(token),
                None => MastodonCredentials::Password {
                    client_id: require(
                        layer(&opts.mastodon_client_id, file.client_id),
                        "mastodon-client-id",
                        "MASTODON_CLIENT_ID",
                    )?,
                    client_secret: require(
                        layer(&opts.mastodon_client_secret, file.client_secret),
                        "mastodon-client-secret",
                        "MASTODON_CLIENT_SECRET",
                    )?,
                    username: require(
                        layer(&opts.mastodon_username, file.username),
                        "mastodon-username",
                        "MASTODON_USERNAME",
                    )?,
                    password: require(
                        layer(&opts.mastodon_password, file.password),
                        "mastodon-password",
                        "MASTODON_PASSWORD",
                    )?,
                },
            };

            MastodonConfig {
                server,
                credentials,
            }
        };

        let github = {
            let opts = &opts.github;
            let file = file.github;

            let token = layer(&opts.github_token, file.token);
            let username = layer(&opts.github_username, file.username);
            let api_url = parse_url(
                "github-api-url",
                layer(&opts.github_api_url, file.api_url),
                github::DEFAULT_API_URL,
            )?;

            (token.is_some() || username.is_some()).then_some(GithubConfig {
                api_url,
                token,
                username,
            })
        };

        let pocket = {
            let opts = &opts.pocket;
            let file = file.pocket;

            let key = layer(&opts.pocket_key, file.key);
            let token = layer(&opts.pocket_token, file.token);
            let api_url = parse_url(
                "pocket-api-url",
                layer(&opts.pocket_api_url, file.api_url),
                pocket::DEFAULT_API_URL,
            )?;

            key.zip(token)
                .map(|(consumer_key, access_token)| PocketConfig {
                    api_url,
                    consumer_key,
                    access_token,
                })
        };

        ensure!(github.is_some() || pocket.is_some(), NoSourceEnabledSnafu);

        let frequency = layer(&opts.frequency, file.frequency)
            .map(|frequency| parse_frequency(&frequency))
            .transpose()
            .context(FrequencySnafu)?;

        let recent_posts_limit = opts
            .recent_posts_limit
            .or(file.recent_posts_limit)
            .unwrap_or(DEFAULT_RECENT_POSTS_LIMIT);
        ensure!(0 < recent_posts_limit, ZeroPostsLimitSnafu);

        Ok(Config {
            mastodon,
            github,
            pocket,
            frequency,
            recent_posts_limit,
            dry_run: opts.dry_run,
        })
    }
}

/// Command line value if set, else the file value; empty strings count as
/// unset.
fn layer(cli: &Option<String>, file: Option<String>) -> Option<String> {
    cli.clone()
        .filter(|value| !value.is_empty())
        .or(file.filter(|value| !value.is_empty()))
}

fn require(
    value: Option<String>,
    flag: &'static str,
    env: &'static str,
) -> ConfigResult<String> {
    value.ok_or(ConfigError::MissingCredential { flag, env })
}

fn parse_url(field: &'static str, value: Option<String>, default: &str) -> ConfigResult<Url> {
    let value = value.unwrap_or_else(|| default.to_owned());
    Url::parse(&value).context(InvalidUrlSnafu { field, value })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::cli::{GithubOpts, MastodonOpts, PocketOpts};

    fn password_opts() -> MastodonOpts {
        MastodonOpts {
            mastodon_client_id: Some("id".into()),
            mastodon_client_secret: Some("secret".into()),
            mastodon_username: Some("me@example.com".into()),
            mastodon_password: Some("hunter2".into()),
            ..MastodonOpts::default()
        }
    }

    fn github_opts() -> GithubOpts {
        GithubOpts {
            github_token: Some("ghp_cli".into()),
            ..GithubOpts::default()
        }
    }

    #[test]
    fn defaults_with_cli_credentials() {
        let opts = Opts {
            mastodon: password_opts(),
            github: github_opts(),
            ..Opts::default()
        };
        let config = Config::from_layers(&opts, FileConfig::default()).unwrap();

        assert_eq!(config.mastodon.server.as_str(), "https://mastodon.social/");
        assert_eq!(
            config.mastodon.credentials,
            MastodonCredentials::Password {
                client_id: "id".into(),
                client_secret: "secret".into(),
                username: "me@example.com".into(),
                password: "hunter2".into(),
            }
        );
        let github = config.github.unwrap();
        assert_eq!(github.api_url.as_str(), "https://api.github.com/");
        assert_eq!(github.token.as_deref(), Some("ghp_cli"));
        assert_eq!(config.pocket, None);
        assert_eq!(config.frequency, None);
        assert_eq!(config.recent_posts_limit, DEFAULT_RECENT_POSTS_LIMIT);
        assert!(!config.dry_run);
    }

    #[test]
    fn file_values_are_overridden_by_cli() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
frequency = "1h"
recent-posts-limit = 80

[github]
token = "ghp_file"
username = "octocat"

[pocket]
key = "pocket-key"
token = "pocket-token"

[mastodon]
server = "https://fosstodon.org"
access-token = "file-token"
"#
        )
        .unwrap();

        let opts = Opts {
            config: Some(file.path().to_owned()),
            frequency: Some("15m".into()),
            github: github_opts(),
            ..Opts::default()
        };
        let config = Config::load(&opts).unwrap();

        assert_eq!(config.frequency, Some(Duration::from_secs(15 * 60)));
        assert_eq!(config.recent_posts_limit, 80);
        assert_eq!(config.mastodon.server.as_str(), "https://fosstodon.org/");
        assert_eq!(
            config.mastodon.credentials,
            MastodonCredentials::AccessToken("file-token".into())
        );

        let github = config.github.unwrap();
        assert_eq!(github.token.as_deref(), Some("ghp_cli"));
        assert_eq!(github.username.as_deref(), Some("octocat"));

        let pocket = config.pocket.unwrap();
        assert_eq!(pocket.consumer_key, "pocket-key");
        assert_eq!(pocket.access_token, "pocket-token");
        assert_eq!(pocket.api_url.as_str(), "https://getpocket.com/");
    }

    #[test]
    fn missing_mastodon_credential_names_the_flag() {
        let opts = Opts {
            mastodon: MastodonOpts {
                mastodon_password: Some(String::new()),
                ..password_opts()
            },
            github: github_opts(),
            ..Opts::default()
        };
        let err = Config::from_layers(&opts, FileConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                flag: "mastodon-password",
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "--mastodon-password or MASTODON_PASSWORD must be set"
        );
    }

    #[test]
    fn pocket_needs_key_and_token() {
        let opts = Opts {
            mastodon: password_opts(),
            github: github_opts(),
            pocket: PocketOpts {
                pocket_key: Some("key".into()),
                ..PocketOpts::default()
            },
            ..Opts::default()
        };
        let config = Config::from_layers(&opts, FileConfig::default()).unwrap();
        assert_eq!(config.pocket, None);
    }

    #[test]
    fn requires_some_source() {
        let opts = Opts {
            mastodon: password_opts(),
            ..Opts::default()
        };
        assert!(matches!(
            Config::from_layers(&opts, FileConfig::default()),
            Err(ConfigError::NoSourceEnabled)
        ));
    }

    #[test]
    fn rejects_bad_frequency_and_limit() {
        let opts = Opts {
            mastodon: password_opts(),
            github: github_opts(),
            frequency: Some("soon".into()),
            ..Opts::default()
        };
        assert!(matches!(
            Config::from_layers(&opts, FileConfig::default()),
            Err(ConfigError::Frequency { .. })
        ));

        let opts = Opts {
            mastodon: password_opts(),
            github: github_opts(),
            recent_posts_limit: Some(0),
            ..Opts::default()
        };
        assert!(matches!(
            Config::from_layers(&opts, FileConfig::default()),
            Err(ConfigError::ZeroPostsLimit)
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Opts {
            config: Some(dir.path().join("absent.toml")),
            ..Opts::default()
        };
        assert!(matches!(
            Config::load(&opts),
            Err(ConfigError::ReadFile { .. })
        ));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "frequency = [").unwrap();
        assert!(matches!(
            FileConfig::read(file.path()),
            Err(ConfigError::ParseFile { .. })
        ));
    }
}

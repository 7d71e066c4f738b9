use std::io;
use std::time::Duration;

use clap::Parser;
use snafu::{ResultExt, Snafu};
use starpocket::cli::Opts;
use starpocket::config::{Config, ConfigError};
use starpocket::cycle::CycleError;
use starpocket::schedule::IntervalTicker;
use starpocket::source::github::GithubStars;
use starpocket::source::mastodon::MastodonClient;
use starpocket::source::pocket::PocketArchive;
use starpocket::source::{
    ArticleSource, DryRunTimeline, RepoSource, SourceError, Timeline,
};
use starpocket::{Bot, PROJECT_NAME, USER_AGENT};
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub const LOG_TARGET: &str = "starpocket::main";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Snafu)]
pub enum BotError {
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },
    #[snafu(display("Failed to build HTTP client"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Mastodon authentication failed"))]
    Authenticate { source: SourceError },
    #[snafu(display("Cycle failed"))]
    Cycle { source: CycleError },
    #[snafu(display("Failed to listen for Ctrl+C"))]
    Signal { source: io::Error },
    #[snafu(display("Logging initialization failed"))]
    Logging,
}

pub type BotResult<T> = std::result::Result<T, BotError>;

#[snafu::report]
#[tokio::main]
async fn main() -> BotResult<()> {
    init_logging()?;

    let opts = Opts::parse();
    let config = Config::load(&opts).context(ConfigSnafu)?;

    run(config).await
}

async fn run(config: Config) -> BotResult<()> {
    info!(
        target: LOG_TARGET,
        server = %config.mastodon.server,
        stars = config.github.is_some(),
        articles = config.pocket.is_some(),
        frequency = ?config.frequency,
        recent_posts_limit = config.recent_posts_limit,
        dry_run = config.dry_run,
        "Starting {PROJECT_NAME}"
    );

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .context(HttpClientSnafu)?;

    let mastodon = MastodonClient::connect(
        http.clone(),
        config.mastodon.server.clone(),
        &config.mastodon.credentials,
    )
    .await
    .context(AuthenticateSnafu)?;

    let timeline: Box<dyn Timeline> = if config.dry_run {
        warn!(target: LOG_TARGET, "Dry run, nothing will be published");
        Box::new(DryRunTimeline::new(mastodon))
    } else {
        Box::new(mastodon)
    };

    let repos = config.github.map(|github| {
        Box::new(GithubStars::new(
            http.clone(),
            github.api_url,
            github.token,
            github.username,
        )) as Box<dyn RepoSource>
    });

    let articles = config.pocket.map(|pocket| {
        Box::new(PocketArchive::new(
            http.clone(),
            pocket.api_url,
            pocket.consumer_key,
            pocket.access_token,
        )) as Box<dyn ArticleSource>
    });

    let bot = Bot::builder()
        .timeline(timeline)
        .maybe_repos(repos)
        .maybe_articles(articles)
        .recent_posts_limit(config.recent_posts_limit)
        .build();

    let Some(frequency) = config.frequency else {
        bot.run_cycle().await.context(CycleSnafu)?;
        return Ok(());
    };

    let mut ticker = IntervalTicker::new(frequency);
    info!(target: LOG_TARGET, period = ?ticker.period(), "Running on schedule. Press Ctrl+C to stop.");

    tokio::select! {
        () = bot.run_scheduled(&mut ticker) => {}
        res = tokio::signal::ctrl_c() => {
            res.context(SignalSnafu)?;
            info!(target: LOG_TARGET, "Interrupted, exiting");
        }
    }

    Ok(())
}

pub fn init_logging() -> BotResult<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|_| BotError::Logging)?;

    Ok(())
}

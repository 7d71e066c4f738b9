//! Announce passes, one per upstream source.
//!
//! Each pass publishes sequentially and gives up on the first failure. There
//! is no bookkeeping of partial progress, because the next cycle finds what
//! was published through [`crate::dedup`].

pub mod articles;
pub mod stars;

use snafu::Snafu;

use crate::source::SourceError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CheckError {
    #[snafu(display("Failed to list starred repos"))]
    FetchRepos { source: SourceError },
    #[snafu(display("Failed to list archived articles"))]
    FetchArticles { source: SourceError },
    #[snafu(display("Failed to publish announcement of {item}"))]
    Publish { item: String, source: SourceError },
}

pub type CheckResult<T> = std::result::Result<T, CheckError>;

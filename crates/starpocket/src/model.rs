use time::OffsetDateTime;

/// A status previously published on the account's timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    /// Content as returned by the platform (HTML for Mastodon)
    pub content: String,
    pub created_at: OffsetDateTime,
    /// A boost of someone else's status
    pub is_reshare: bool,
    pub is_reply: bool,
}

impl Post {
    /// Whether this post was authored by the account as a top-level status
    pub fn is_own_status(&self) -> bool {
        !self.is_reshare && !self.is_reply
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarredRepo {
    pub html_url: String,
    pub description: String,
    pub license_key: Option<String>,
    pub language: Option<String>,
    pub topics: Vec<String>,
}

impl StarredRepo {
    /// The URL used both in the announcement and to recognize it later
    pub fn canonical_url(&self) -> &str {
        &self.html_url
    }

    /// License, language and topics, in that order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.license_key
            .as_deref()
            .into_iter()
            .chain(self.language.as_deref())
            .chain(self.topics.iter().map(String::as_str))
    }
}

/// An archived saved article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub archived_at: OffsetDateTime,
}

/// Cutoff below which articles are assumed to be announced already
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watermark {
    /// Creation time of the latest announcement post in the window
    Found(OffsetDateTime),
    /// No announcement in the window; carries the oldest post time, if any
    NotFound(Option<OffsetDateTime>),
}

impl Watermark {
    pub fn since(&self) -> Option<OffsetDateTime> {
        match self {
            Watermark::Found(at) => Some(*at),
            Watermark::NotFound(oldest) => *oldest,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Watermark::Found(_))
    }
}

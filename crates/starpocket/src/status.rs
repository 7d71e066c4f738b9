//! Text of the statuses we publish.
//!
//! The lead lines double as markers: [`crate::dedup`] later searches the
//! account's own timeline for them, so changing their wording makes previously
//! published announcements invisible to de-duplication.

use crate::model::{Article, StarredRepo};

/// Lead of a starred repository announcement
pub const STARRED_LEAD: &str = "I just starred";

/// Lead of an archived article announcement, also the watermark marker
pub const POCKETED_MARKER: &str = "I just pocketed:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Starred,
    Pocketed,
}

impl StatusKind {
    fn lead(self) -> &'static str {
        match self {
            StatusKind::Starred => STARRED_LEAD,
            StatusKind::Pocketed => POCKETED_MARKER,
        }
    }
}

/// Build the status text.
///
/// Layout is a lead line (`<lead> <primary>`), then the url paragraph when it
/// differs from `primary`, then the description paragraph when non-empty, and
/// finally a single line of hashtags. Every paragraph is followed by a blank
/// line.
pub fn format_status<I, S>(
    kind: StatusKind,
    primary: &str,
    url: &str,
    description: &str,
    tags: I,
) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = format!("{} {primary}\n\n", kind.lead());

    if !url.is_empty() && url != primary {
        text.push_str(url);
        text.push_str("\n\n");
    }

    if !description.is_empty() {
        text.push_str(description);
        text.push_str("\n\n");
    }

    let hashtags: Vec<String> = tags
        .into_iter()
        .map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("#{tag}"))
        .collect();
    text.push_str(&hashtags.join(" "));

    collapse_indented_lines(&text)
}

pub fn starred_repo(repo: &StarredRepo) -> String {
    format_status(
        StatusKind::Starred,
        repo.canonical_url(),
        repo.canonical_url(),
        &repo.description,
        repo.tags(),
    )
}

pub fn pocketed_article(article: &Article) -> String {
    format_status(
        StatusKind::Pocketed,
        &article.title,
        &article.url,
        "",
        &article.tags,
    )
}

/// Hashtags end at whitespace, so any of it is dropped
pub fn normalize_tag(tag: &str) -> String {
    tag.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replace every `"\n "` with `"\n"` until none is left.
fn collapse_indented_lines(text: &str) -> String {
    let mut out = text.to_owned();
    while out.contains("\n ") {
        out = out.replace("\n ", "\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn repo() -> StarredRepo {
        StarredRepo {
            html_url: "https://github.com/dpc/rostra".into(),
            description: "A p2p social network".into(),
            license_key: Some("mit".into()),
            language: Some("Rust".into()),
            topics: vec!["p2p".into(), "social-network".into()],
        }
    }

    #[test]
    fn starred_repo_full() {
        assert_eq!(
            starred_repo(&repo()),
            "I just starred https://github.com/dpc/rostra\n\n\
             A p2p social network\n\n\
             #mit #Rust #p2p #social-network"
        );
    }

    #[test]
    fn starred_repo_without_description_or_metadata() {
        let repo = StarredRepo {
            description: String::new(),
            license_key: None,
            language: None,
            topics: vec![],
            ..repo()
        };
        assert_eq!(
            starred_repo(&repo),
            "I just starred https://github.com/dpc/rostra\n\n"
        );
    }

    #[test]
    fn pocketed_article_strips_spaces_from_tags() {
        let article = Article {
            title: "Writing a bot".into(),
            url: "https://example.com/bot".into(),
            tags: vec!["rust lang".into(), "bots".into(), " ".into()],
            archived_at: datetime!(2024-01-01 0:00 UTC),
        };
        assert_eq!(
            pocketed_article(&article),
            "I just pocketed: Writing a bot\n\nhttps://example.com/bot\n\n#rustlang #bots"
        );
    }

    #[test]
    fn indented_lines_are_collapsed() {
        let text = format_status(
            StatusKind::Starred,
            "https://github.com/a/b",
            "https://github.com/a/b",
            "first\n  second\n third",
            ["x"],
        );
        assert!(!text.contains("\n "), "{text:?}");
        assert!(text.contains("first\nsecond\nthird\n\n#x"), "{text:?}");
    }

    #[test]
    fn url_paragraph_only_when_distinct() {
        let text = format_status(StatusKind::Pocketed, "Title", "", "", Vec::<String>::new());
        assert_eq!(text, "I just pocketed: Title\n\n");
    }

    #[test]
    fn normalize_tag_removes_all_whitespace() {
        assert_eq!(normalize_tag(" machine\tlearning  ops "), "machinelearningops");
    }
}

//! De-duplication against the account's own timeline.
//!
//! Nothing is stored between cycles. Whether an item was announced is decided
//! only from the window of recent posts, so anything older than the window is
//! forgotten.

use crate::model::{Post, Watermark};

/// Posts that count as our own announcements, in delivery order
fn own_statuses(posts: &[Post]) -> impl Iterator<Item = &Post> {
    posts.iter().filter(|post| post.is_own_status())
}

/// Whether any own status contains `needle` verbatim (case-sensitive).
pub fn already_announced(posts: &[Post], needle: &str) -> bool {
    own_statuses(posts).any(|post| post.content.contains(needle))
}

/// Find the creation time of the first own status containing `marker`.
///
/// Falls back to the oldest post in the window (reshares and replies
/// included) when there is none.
pub fn find_watermark(posts: &[Post], marker: &str) -> Watermark {
    match own_statuses(posts).find(|post| post.content.contains(marker)) {
        Some(post) => Watermark::Found(post.created_at),
        None => Watermark::NotFound(posts.iter().map(|post| post.created_at).min()),
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use time::macros::datetime;

    use super::*;

    fn post(id: &str, content: &str, created_at: OffsetDateTime) -> Post {
        Post {
            id: id.into(),
            content: content.into(),
            created_at,
            is_reshare: false,
            is_reply: false,
        }
    }

    #[test]
    fn matches_own_status() {
        let posts = vec![
            post("2", "<p>hello</p>", datetime!(2024-03-02 0:00 UTC)),
            post(
                "1",
                "<p>I just starred https://github.com/a/b</p>",
                datetime!(2024-03-01 0:00 UTC),
            ),
        ];
        assert!(already_announced(&posts, "https://github.com/a/b"));
        assert!(!already_announced(&posts, "https://github.com/a/c"));
    }

    #[test]
    fn ignores_reshares_and_replies() {
        let posts = vec![
            Post {
                is_reshare: true,
                ..post("2", "https://github.com/a/b", datetime!(2024-03-02 0:00 UTC))
            },
            Post {
                is_reply: true,
                ..post("1", "https://github.com/a/b", datetime!(2024-03-01 0:00 UTC))
            },
        ];
        assert!(!already_announced(&posts, "https://github.com/a/b"));
    }

    #[test]
    fn match_is_case_sensitive() {
        let posts = vec![post(
            "1",
            "https://github.com/Owner/Repo",
            datetime!(2024-03-01 0:00 UTC),
        )];
        assert!(!already_announced(&posts, "https://github.com/owner/repo"));
    }

    #[test]
    fn watermark_is_latest_marker_post() {
        let posts = vec![
            post("4", "something else", datetime!(2024-03-04 0:00 UTC)),
            Post {
                is_reply: true,
                ..post("3", "I just pocketed: reply", datetime!(2024-03-03 0:00 UTC))
            },
            post("2", "I just pocketed: newer", datetime!(2024-03-02 0:00 UTC)),
            post("1", "I just pocketed: older", datetime!(2024-03-01 0:00 UTC)),
        ];
        assert_eq!(
            find_watermark(&posts, "I just pocketed:"),
            Watermark::Found(datetime!(2024-03-02 0:00 UTC))
        );
    }

    #[test]
    fn watermark_falls_back_to_oldest_post() {
        let posts = vec![
            post("3", "a", datetime!(2024-03-03 0:00 UTC)),
            Post {
                is_reshare: true,
                ..post("1", "I just pocketed: boosted", datetime!(2024-02-01 0:00 UTC))
            },
            post("2", "b", datetime!(2024-03-02 0:00 UTC)),
        ];
        let watermark = find_watermark(&posts, "I just pocketed:");
        assert!(!watermark.is_found());
        assert_eq!(watermark.since(), Some(datetime!(2024-02-01 0:00 UTC)));
    }

    #[test]
    fn watermark_of_empty_window() {
        let watermark = find_watermark(&[], "I just pocketed:");
        assert_eq!(watermark, Watermark::NotFound(None));
        assert_eq!(watermark.since(), None);
    }
}

//! Blog post, writer, and reading-history types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ultre_core::{Email, PostId};

/// A blog post, persisted or built-in.
///
/// Built-in posts carry only id/title/excerpt/content; writer-published
/// posts also carry authorship and a publication date, so those fields are
/// optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    /// Post body as HTML.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Whether the authoring writer was verified at publish time.
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

/// A blog writer and their verification state.
///
/// The record moves `unregistered → code-sent → verified`; the code fields
/// only exist in the `code-sent` state and are cleared on verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Writer {
    pub name: String,
    /// Unique, matched case-insensitively.
    pub email: Email,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub code_sent_at: Option<DateTime<Utc>>,
}

/// One entry of the recently-read history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewed {
    pub id: PostId,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub seen_at: DateTime<Utc>,
}

/// A post as it appears in the rendered list: derived excerpt, resolved
/// author, verification badge.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub author: String,
    pub verified: bool,
    pub excerpt: String,
    pub date: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub read_time: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_builtin_post_decodes() {
        let raw = r#"{"id":"post_1","title":"T","content":"<p>b</p>","excerpt":"b"}"#;
        let post: BlogPost = serde_json::from_str(raw).unwrap();
        assert!(!post.verified);
        assert!(post.author.is_none());
        assert!(post.date.is_none());
    }

    #[test]
    fn test_writer_code_fields_absent_when_cleared() {
        let writer = Writer {
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            verified: true,
            code: None,
            code_sent_at: None,
        };

        let json = serde_json::to_value(&writer).unwrap();
        assert!(json.get("code").is_none());
        assert!(json.get("codeSentAt").is_none());
    }

    #[test]
    fn test_writer_code_sent_at_is_millis_on_the_wire() {
        let writer = Writer {
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            verified: false,
            code: Some("123456".to_owned()),
            code_sent_at: DateTime::from_timestamp_millis(1_700_000_000_000),
        };

        let json = serde_json::to_value(&writer).unwrap();
        assert_eq!(json.get("codeSentAt").unwrap(), 1_700_000_000_000_i64);
    }
}

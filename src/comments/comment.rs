use chrono::{DateTime, SecondsFormat, Utc};
use html_escape::encode_text;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comments::comment_panel::MSG_FILL_BOTH;

pub const MAX_NAME_CHARS: usize = 80;
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// A reader comment as stored by the backend. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(rename = "name")]
    pub author_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Payload sent to the backend. Values are already trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    pub post_id: String,
    #[serde(rename = "name")]
    pub author_name: String,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidComment {
    #[error("{}", MSG_FILL_BOTH)]
    Blank,

    #[error("The {field} is limited to {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl NewComment {
    /// Trims both fields. Both must be non-empty and within their length caps.
    pub fn validated(post_id: &str, author_name: &str, message: &str) -> Result<NewComment, InvalidComment> {
        let author_name = author_name.trim();
        let message = message.trim();
        if author_name.is_empty() || message.is_empty() {
            return Err(InvalidComment::Blank);
        }
        if author_name.chars().count() > MAX_NAME_CHARS {
            return Err(InvalidComment::TooLong { field: "name", max: MAX_NAME_CHARS });
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(InvalidComment::TooLong { field: "message", max: MAX_MESSAGE_CHARS });
        }

        Ok(NewComment {
            post_id: post_id.to_string(),
            author_name: author_name.to_string(),
            message: message.to_string(),
        })
    }
}

/// e.g. `Aug 12, 2025, 03:45 PM`, in UTC. The page script replaces it with
/// the reader's local time using [`comment_datetime`].
pub fn format_comment_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Machine readable timestamp for the `datetime` attribute.
pub fn comment_datetime(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Escaped message keeping the line breaks typed by the author.
pub fn message_html(message: &str) -> String {
    message.lines()
        .map(|line| encode_text(line).to_string())
        .collect::<Vec<String>>()
        .join("<br />")
}

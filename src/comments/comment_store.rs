use std::future::Future;
use std::sync::Mutex;

use chrono::Utc;
use serde::de::DeserializeOwned;
use spdlog::info;
use thiserror::Error;
use uuid::Uuid;

use crate::comments::comment::{Comment, NewComment};
use crate::config::{CommentBackendKind, Comments};

#[derive(Error, Debug)]
pub enum CommentError {
    #[error("Comment backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Comment backend rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid comment backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Comment backend returned no comment")]
    Empty,
}

/// Remote persistence of comments.
pub trait CommentStore {
    /// All comments of a post, newest first.
    fn list(&self, post_id: &str) -> impl Future<Output = Result<Vec<Comment>, CommentError>> + Send;

    /// Stores a comment and returns it with the fields assigned by the backend.
    fn create(&self, comment: &NewComment) -> impl Future<Output = Result<Comment, CommentError>> + Send;
}

/// Comments table behind a PostgREST style API.
pub struct RestCommentStore {
    client: reqwest::Client,
    table_url: String,
    api_key: Option<String>,
}

impl RestCommentStore {
    pub fn new(base_url: &str, table: &str, api_key: Option<String>) -> Self {
        RestCommentStore {
            client: reqwest::Client::new(),
            table_url: format!("{}/{}", base_url.trim_end_matches('/'), table),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, &self.table_url)
            .header("Accept", "application/json");
        match self.api_key {
            Some(ref api_key) => builder
                .header("apikey", api_key)
                .header("Authorization", format!("Bearer {}", api_key)),
            None => builder,
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CommentError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(CommentError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

impl CommentStore for RestCommentStore {
    async fn list(&self, post_id: &str) -> Result<Vec<Comment>, CommentError> {
        let response = self.request(reqwest::Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("post_id", format!("eq.{}", post_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        read_json(response).await
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentError> {
        let response = self.request(reqwest::Method::POST)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(comment)
            .send()
            .await?;
        let created: Vec<Comment> = read_json(response).await?;
        created.into_iter().next().ok_or(CommentError::Empty)
    }
}

/// Process local store, used when no backend is configured. Comments are lost
/// on restart.
#[derive(Default)]
pub struct MemoryCommentStore {
    comments: Mutex<Vec<Comment>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommentStore for MemoryCommentStore {
    async fn list(&self, post_id: &str) -> Result<Vec<Comment>, CommentError> {
        let comments = self.comments.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Later insertions first when timestamps tie
        let mut found: Vec<Comment> = comments.iter().rev()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentError> {
        let created = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: comment.post_id.clone(),
            author_name: comment.author_name.clone(),
            message: comment.message.clone(),
            created_at: Utc::now(),
        };
        let mut comments = self.comments.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        comments.push(created.clone());
        Ok(created)
    }
}

/// The store selected by the `[comments]` configuration.
pub enum CommentBackend {
    Memory(MemoryCommentStore),
    Rest(RestCommentStore),
}

impl CommentBackend {
    pub fn from_config(cfg: Option<&Comments>) -> CommentBackend {
        match cfg {
            Some(Comments { backend: CommentBackendKind::Rest, url: Some(url), api_key, table }) => {
                info!("Comments are stored in {}/{}", url, table);
                CommentBackend::Rest(RestCommentStore::new(url, table, api_key.clone()))
            }
            _ => {
                info!("Comments are kept in memory");
                CommentBackend::Memory(MemoryCommentStore::new())
            }
        }
    }
}

impl CommentStore for CommentBackend {
    async fn list(&self, post_id: &str) -> Result<Vec<Comment>, CommentError> {
        match self {
            CommentBackend::Memory(store) => store.list(post_id).await,
            CommentBackend::Rest(store) => store.list(post_id).await,
        }
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentError> {
        match self {
            CommentBackend::Memory(store) => store.create(comment).await,
            CommentBackend::Rest(store) => store.create(comment).await,
        }
    }
}

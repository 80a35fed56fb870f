use spdlog::{debug, error};

use crate::comments::comment::{Comment, NewComment};
use crate::comments::comment_store::{CommentError, CommentStore};

pub const MSG_FILL_BOTH: &str = "Please fill in both name and message fields";
pub const MSG_POSTED: &str = "Comment posted successfully!";
pub const MSG_POST_FAILED: &str = "Failed to post comment. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success(message) | Notification::Error(message) => message,
        }
    }
}

/// Identifies the post and panel generation a fetch was started for.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub post_id: String,
    generation: u64,
}

/// Comment list and submission form of one post. The server drives it for
/// page loads and the plain form post; `res/public/site.js` applies the same
/// submit rules over the JSON API.
pub struct CommentPanel<'s, S> {
    store: &'s S,
    post_id: String,
    generation: u64,
    name: String,
    message: String,
    comments: Vec<Comment>,
    loaded: bool,
    submitting: bool,
    notifications: Vec<Notification>,
}

impl<'s, S: CommentStore> CommentPanel<'s, S> {
    pub fn new(store: &'s S, post_id: &str) -> Self {
        CommentPanel {
            store,
            post_id: post_id.to_string(),
            generation: 0,
            name: String::new(),
            message: String::new(),
            comments: vec![],
            loaded: false,
            submitting: false,
            notifications: vec![],
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// True once a fetch for the current post succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    /// While true the submit control is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Scopes the panel to another post. Responses of fetches started before
    /// the switch are discarded.
    pub fn switch_post(&mut self, post_id: &str) {
        if self.post_id == post_id {
            return;
        }
        self.post_id = post_id.to_string();
        self.generation += 1;
        self.comments.clear();
        self.loaded = false;
    }

    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            post_id: self.post_id.clone(),
            generation: self.generation,
        }
    }

    /// Applies a fetch result. Returns true when the list was replaced.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Comment>, CommentError>) -> bool {
        if ticket.generation != self.generation || ticket.post_id != self.post_id {
            debug!("Discarding stale comments of post {} (panel is on {})", ticket.post_id, self.post_id);
            return false;
        }

        match result {
            Ok(comments) => {
                self.comments = comments;
                self.loaded = true;
                true
            }
            Err(e) => {
                error!("Error fetching comments of post {}: {}", ticket.post_id, e);
                false
            }
        }
    }

    pub async fn fetch(&mut self) -> bool {
        let ticket = self.begin_fetch();
        let result = self.store.list(&ticket.post_id).await;
        self.apply_fetch(ticket, result)
    }

    /// Validates the form and marks the submission in flight. `None` when the
    /// form is invalid or a submission is already running.
    pub fn begin_submit(&mut self) -> Option<NewComment> {
        if self.submitting {
            return None;
        }

        match NewComment::validated(&self.post_id, &self.name, &self.message) {
            Ok(new_comment) => {
                self.submitting = true;
                Some(new_comment)
            }
            Err(e) => {
                self.notifications.push(Notification::Error(e.to_string()));
                None
            }
        }
    }

    /// Completes a submission started with [`Self::begin_submit`]. Returns true
    /// when the comment was created, in which case the list should be fetched
    /// again.
    pub fn finish_submit(&mut self, result: Result<Comment, CommentError>) -> bool {
        let created = self.record_submit(result);
        self.submitting = false;
        created
    }

    /// Full submission: create, then fetch the list again on success.
    pub async fn submit(&mut self) -> bool {
        let Some(new_comment) = self.begin_submit() else {
            return false;
        };

        let result = self.store.create(&new_comment).await;
        let created = self.record_submit(result);
        if created {
            self.fetch().await;
        }
        self.submitting = false;
        created
    }

    fn record_submit(&mut self, result: Result<Comment, CommentError>) -> bool {
        match result {
            Ok(comment) => {
                debug!("Comment {} created on post {}", comment.id, comment.post_id);
                self.name.clear();
                self.message.clear();
                self.notifications.push(Notification::Success(MSG_POSTED.to_string()));
                true
            }
            Err(e) => {
                error!("Error posting comment on post {}: {}", self.post_id, e);
                self.notifications.push(Notification::Error(MSG_POST_FAILED.to_string()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};

    use crate::comments::comment::MAX_MESSAGE_CHARS;

    use super::*;

    #[derive(Default)]
    struct CountingStore {
        list_calls: AtomicUsize,
        created: Mutex<Vec<NewComment>>,
        stored: Mutex<Vec<Comment>>,
        fail_create: bool,
        fail_list: bool,
    }

    impl CountingStore {
        fn create_calls(&self) -> usize {
            self.created.lock().unwrap().len()
        }
    }

    fn comment(id: &str, post_id: &str, name: &str, minute: u32) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_name: name.to_string(),
            message: "hello".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 12, 15, minute, 0).unwrap(),
        }
    }

    impl CommentStore for CountingStore {
        async fn list(&self, post_id: &str) -> Result<Vec<Comment>, CommentError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(CommentError::Rejected { status: 503, body: "down".to_string() });
            }
            let mut comments: Vec<Comment> = self.stored.lock().unwrap().iter()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(comments)
        }

        async fn create(&self, new_comment: &NewComment) -> Result<Comment, CommentError> {
            self.created.lock().unwrap().push(new_comment.clone());
            if self.fail_create {
                return Err(CommentError::Rejected { status: 400, body: "bad".to_string() });
            }
            let mut stored = self.stored.lock().unwrap();
            let created = Comment {
                id: format!("c{}", stored.len()),
                post_id: new_comment.post_id.clone(),
                author_name: new_comment.author_name.clone(),
                message: new_comment.message.clone(),
                created_at: Utc.with_ymd_and_hms(2025, 8, 12, 16, 0, 0).unwrap(),
            };
            stored.push(created.clone());
            Ok(created)
        }
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_locally() {
        let store = CountingStore::default();
        let mut panel = CommentPanel::new(&store, "eam");
        panel.set_name("  ");
        panel.set_message("hello");

        assert!(!panel.submit().await);
        assert_eq!(store.create_calls(), 0);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(panel.notifications(), &[Notification::Error(MSG_FILL_BOTH.to_string())]);
        assert!(!panel.is_submitting());
        assert!(!panel.is_loaded());
    }

    #[tokio::test]
    async fn test_overlong_message_is_rejected_locally() {
        let store = CountingStore::default();
        let mut panel = CommentPanel::new(&store, "eam");
        panel.set_name("Ada");
        panel.set_message(&"a".repeat(MAX_MESSAGE_CHARS + 1));

        assert!(!panel.submit().await);
        assert_eq!(store.create_calls(), 0);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
        assert!(panel.notifications()[0].is_error());
        assert_eq!(panel.notifications()[0].message(), "The message is limited to 4000 characters");
    }

    #[tokio::test]
    async fn test_successful_submit() {
        let store = CountingStore::default();
        let mut panel = CommentPanel::new(&store, "eam");
        panel.set_name(" Ada ");
        panel.set_message("Hi\n");

        assert!(panel.submit().await);
        assert_eq!(*store.created.lock().unwrap(), vec![NewComment {
            post_id: "eam".to_string(),
            author_name: "Ada".to_string(),
            message: "Hi".to_string(),
        }]);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(panel.name(), "");
        assert_eq!(panel.message(), "");
        assert_eq!(panel.notifications(), &[Notification::Success(MSG_POSTED.to_string())]);
        assert_eq!(panel.comments().len(), 1);
        assert_eq!(panel.comments()[0].id, "c0");
        assert!(!panel.is_submitting());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_input() {
        let store = CountingStore { fail_create: true, ..Default::default() };
        let mut panel = CommentPanel::new(&store, "eam");
        panel.set_name(" Ada ");
        panel.set_message("Hi");

        assert!(!panel.submit().await);
        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(panel.name(), " Ada ");
        assert_eq!(panel.message(), "Hi");
        assert_eq!(panel.notifications(), &[Notification::Error(MSG_POST_FAILED.to_string())]);
        assert!(panel.notifications()[0].is_error());
        assert!(!panel.is_loaded());
    }

    #[test]
    fn test_submission_in_flight_blocks_another() {
        let store = CountingStore::default();
        let mut panel = CommentPanel::new(&store, "eam");
        panel.set_name("Ada");
        panel.set_message("Hi");

        assert!(panel.begin_submit().is_some());
        assert!(panel.is_submitting());
        assert!(panel.begin_submit().is_none());
        assert!(panel.notifications().is_empty());

        assert!(panel.finish_submit(Ok(comment("c9", "eam", "Ada", 1))));
        assert!(!panel.is_submitting());
        assert!(panel.begin_submit().is_none());
    }

    #[tokio::test]
    async fn test_fetch_newest_first() {
        let store = CountingStore::default();
        store.stored.lock().unwrap().extend([
            comment("a", "eam", "Ada", 1),
            comment("b", "eam", "Grace", 30),
            comment("c", "ps-intro", "Alan", 10),
        ]);
        let mut panel = CommentPanel::new(&store, "eam");

        assert!(!panel.is_loaded());
        assert!(panel.fetch().await);
        assert!(panel.is_loaded());
        let ids: Vec<&str> = panel.comments().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_list() {
        let store = CountingStore::default();
        store.stored.lock().unwrap().push(comment("a", "eam", "Ada", 1));
        let mut panel = CommentPanel::new(&store, "eam");
        panel.fetch().await;

        let failing = CountingStore { fail_list: true, ..Default::default() };
        let ticket = panel.begin_fetch();
        let result = failing.list("eam").await;
        assert!(!panel.apply_fetch(ticket, result));
        assert_eq!(panel.comments().len(), 1);
        assert!(panel.notifications().is_empty());
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let store = CountingStore::default();
        let mut panel = CommentPanel::new(&store, "eam");
        let stale = panel.begin_fetch();

        panel.switch_post("ps-intro");
        let current = panel.begin_fetch();
        assert_eq!(current.post_id, "ps-intro");

        assert!(!panel.apply_fetch(stale, Ok(vec![comment("a", "eam", "Ada", 1)])));
        assert!(panel.comments().is_empty());

        assert!(panel.apply_fetch(current, Ok(vec![comment("b", "ps-intro", "Grace", 2)])));
        assert_eq!(panel.comments()[0].id, "b");
    }

    #[test]
    fn test_switching_back_still_discards() {
        let store = CountingStore::default();
        let mut panel = CommentPanel::new(&store, "eam");
        let first = panel.begin_fetch();
        panel.switch_post("ps-intro");
        panel.switch_post("eam");

        assert!(!panel.apply_fetch(first, Ok(vec![comment("a", "eam", "Ada", 1)])));
    }
}

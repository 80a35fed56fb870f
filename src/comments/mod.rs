pub mod comment;
pub mod comment_panel;
pub mod comment_store;

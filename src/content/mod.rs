pub mod content_cache;
pub mod content_store;
pub mod post;

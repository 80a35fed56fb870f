pub mod anchors;
pub mod article;
pub mod code_block;
pub mod comments;
pub mod config;
pub mod content;
pub mod logger;
pub mod markup;
pub mod progress;
pub mod server;
pub mod translate;
pub mod view;
mod test_data;

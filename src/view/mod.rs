pub mod index_renderer;
pub mod post_renderer;

pub mod html_writer;
pub mod parser;
pub mod render_node;
pub mod style;
pub mod surface;

use spdlog::debug;

use crate::anchors::{self, AnchorStrategy};
use crate::code_block::CodeBlockPresenter;
use crate::content::post::Post;
use crate::markup::html_writer::HtmlWriter;
use crate::markup::style::StyleMap;
use crate::markup::surface::Surface;

/// Entry of the table of contents. With positional anchors the text is the
/// curated text of the declared heading.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// A post body rendered to HTML, with its headings addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArticle {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Renders `post`: markdown to render nodes, anchors assigned with
/// `strategy`, then HTML.
pub fn render_post(post: &Post, strategy: AnchorStrategy, styles: &StyleMap, code_blocks: &CodeBlockPresenter) -> RenderedArticle {
    let mut surface = Surface::from_markdown(&post.body);
    let assigned = anchors::apply(strategy, &mut surface, post);
    debug!("Post {}: {} headings rendered, {} anchored", post.id, surface.heading_count(), assigned);

    let toc = match strategy {
        AnchorStrategy::Positional => post.headings.iter()
            .take(assigned)
            .map(|heading| TocEntry {
                id: heading.id.clone(),
                text: heading.text.clone(),
                level: heading.level,
            })
            .collect(),
        AnchorStrategy::Derived => surface.headings().iter()
            .zip(surface.anchors())
            .filter_map(|((level, text), anchor)| anchor.as_ref().map(|id| TocEntry {
                id: id.clone(),
                text: text.clone(),
                level: *level,
            }))
            .collect(),
    };

    RenderedArticle {
        html: HtmlWriter::new(styles, code_blocks).write(&surface),
        toc,
    }
}

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::code_block::{class_attr, CodeBlockPresenter};
use crate::markup::render_node::{RenderNode, TableRow};
use crate::markup::style::StyleMap;
use crate::markup::surface::Surface;

const SAFE_PROTOCOLS: [&str; 6] = ["http", "https", "mailto", "irc", "ircs", "xmpp"];

/// Writes a surface as HTML, one rendering rule per node kind.
pub struct HtmlWriter<'a> {
    styles: &'a StyleMap,
    code_blocks: &'a CodeBlockPresenter,
}

struct WriteState<'s> {
    anchors: &'s [Option<String>],
    heading_index: usize,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(styles: &'a StyleMap, code_blocks: &'a CodeBlockPresenter) -> Self {
        HtmlWriter {
            styles,
            code_blocks,
        }
    }

    pub fn write(&self, surface: &Surface) -> String {
        let mut html = String::new();
        let mut state = WriteState {
            anchors: surface.anchors(),
            heading_index: 0,
        };
        self.write_nodes(surface.nodes(), &mut state, &mut html);
        html
    }

    fn write_nodes(&self, nodes: &[RenderNode], state: &mut WriteState, html: &mut String) {
        for node in nodes {
            self.write_node(node, state, html);
        }
    }

    fn write_node(&self, node: &RenderNode, state: &mut WriteState, html: &mut String) {
        let styles = self.styles;
        match node {
            RenderNode::Heading { level, children } => {
                let level = (*level).clamp(1, 6);
                let id = state.anchors.get(state.heading_index).and_then(|anchor| anchor.as_deref());
                state.heading_index += 1;

                let _ = write!(html, "<h{}", level);
                if let Some(id) = id {
                    let _ = write!(html, " id=\"{}\"", encode_double_quoted_attribute(id));
                }
                html.push_str(&class_attr(styles.heading(level)));
                html.push('>');
                self.write_nodes(children, state, html);
                let _ = writeln!(html, "</h{}>", level);
            }
            RenderNode::Paragraph(children) => {
                self.open("p", &styles.paragraph, html);
                self.write_nodes(children, state, html);
                html.push_str("</p>\n");
            }
            RenderNode::List { ordered, start, items } => {
                if *ordered {
                    html.push_str("<ol");
                    html.push_str(&class_attr(&styles.ordered_list));
                    if let Some(start) = start.filter(|start| *start != 1) {
                        let _ = write!(html, " start=\"{}\"", start);
                    }
                    html.push_str(">\n");
                } else {
                    self.open("ul", &styles.unordered_list, html);
                    html.push('\n');
                }
                self.write_nodes(items, state, html);
                html.push_str(if *ordered { "</ol>\n" } else { "</ul>\n" });
            }
            RenderNode::ListItem(children) => {
                self.open("li", &styles.list_item, html);
                self.write_nodes(children, state, html);
                html.push_str("</li>\n");
            }
            RenderNode::Blockquote(children) => {
                self.open("blockquote", &styles.blockquote, html);
                html.push('\n');
                self.write_nodes(children, state, html);
                html.push_str("</blockquote>\n");
            }
            RenderNode::Link { href, children } => {
                let href = safe_url(href);
                let _ = write!(html, "<a href=\"{}\"{}", encode_double_quoted_attribute(href), class_attr(&styles.link));
                if href.starts_with("http") {
                    html.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                }
                html.push('>');
                self.write_nodes(children, state, html);
                html.push_str("</a>");
            }
            RenderNode::Image { src, alt, title } => {
                let _ = write!(html, "<img src=\"{}\" alt=\"{}\"",
                               encode_double_quoted_attribute(safe_url(src)),
                               encode_double_quoted_attribute(alt));
                if let Some(title) = title {
                    let _ = write!(html, " title=\"{}\"", encode_double_quoted_attribute(title));
                }
                html.push_str(&class_attr(&styles.image));
                html.push_str(" />");
            }
            RenderNode::Table { rows } => self.write_table(rows, state, html),
            RenderNode::CodeBlock { language, text } => {
                html.push_str(&self.code_blocks.render(language.as_deref(), text, styles));
                html.push('\n');
            }
            RenderNode::InlineCode(text) => {
                let _ = write!(html, "<code{}>{}</code>", class_attr(&styles.inline_code), encode_text(text));
            }
            RenderNode::Emphasis(children) => self.wrap("em", children, state, html),
            RenderNode::Strong(children) => self.wrap("strong", children, state, html),
            RenderNode::Strikethrough(children) => self.wrap("del", children, state, html),
            RenderNode::LineBreak => html.push_str("<br />\n"),
            RenderNode::ThematicBreak => {
                let _ = writeln!(html, "<hr{} />", class_attr(&styles.horizontal_rule));
            }
            RenderNode::PlainText(text) => html.push_str(&encode_text(text)),
        }
    }

    fn write_table(&self, rows: &[TableRow], state: &mut WriteState, html: &mut String) {
        let styles = self.styles;
        self.open("div", &styles.table_wrapper, html);
        self.open("table", &styles.table, html);
        html.push('\n');

        let (head, body): (Vec<&TableRow>, Vec<&TableRow>) = rows.iter().partition(|row| row.header);
        for (section, rows) in [("thead", head), ("tbody", body)] {
            if rows.is_empty() {
                continue;
            }
            let _ = writeln!(html, "<{}>", section);
            for row in rows {
                html.push_str("<tr>");
                for cell in row.cells.iter() {
                    if row.header {
                        self.open("th", &styles.table_header_cell, html);
                        self.write_nodes(cell, state, html);
                        html.push_str("</th>");
                    } else {
                        self.open("td", &styles.table_cell, html);
                        self.write_nodes(cell, state, html);
                        html.push_str("</td>");
                    }
                }
                html.push_str("</tr>\n");
            }
            let _ = writeln!(html, "</{}>", section);
        }

        html.push_str("</table></div>\n");
    }

    fn open(&self, tag: &str, class: &str, html: &mut String) {
        let _ = write!(html, "<{}{}>", tag, class_attr(class));
    }

    fn wrap(&self, tag: &str, children: &[RenderNode], state: &mut WriteState, html: &mut String) {
        let _ = write!(html, "<{}>", tag);
        self.write_nodes(children, state, html);
        let _ = write!(html, "</{}>", tag);
    }
}

/// Relative URLs and known protocols pass through, anything else becomes empty.
fn safe_url(url: &str) -> &str {
    let Some(colon) = url.find(':') else {
        return url;
    };
    let before = &url[..colon];
    if before.contains(['/', '?', '#']) {
        return url;
    }
    if SAFE_PROTOCOLS.iter().any(|protocol| before.eq_ignore_ascii_case(protocol)) {
        url
    } else {
        ""
    }
}

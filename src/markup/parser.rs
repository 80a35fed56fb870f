use std::collections::HashMap;

use markdown::mdast::Node;
use markdown::ParseOptions;
use spdlog::warn;

use crate::code_block::{parse_language, strip_trailing_newline};
use crate::markup::render_node::{RenderNode, TableRow};

/// Parses markdown into render nodes. Never fails: input the parser cannot
/// handle comes back as literal text.
pub fn parse(md_text: &str) -> Vec<RenderNode> {
    let root = match markdown::to_mdast(md_text, &ParseOptions::gfm()) {
        Ok(root) => root,
        Err(e) => {
            warn!("Markdown could not be parsed, rendering as text: {}", e.reason);
            return vec![RenderNode::PlainText(md_text.to_string())];
        }
    };

    let mut definitions = HashMap::new();
    collect_definitions(&root, &mut definitions);

    let converter = Converter {
        source: md_text,
        definitions,
    };
    let mut nodes = vec![];
    converter.convert_into(&root, &mut nodes);
    nodes
}

struct Definition {
    url: String,
    title: Option<String>,
}

struct Converter<'a> {
    source: &'a str,
    definitions: HashMap<String, Definition>,
}

impl Converter<'_> {
    fn convert_all(&self, nodes: &[Node]) -> Vec<RenderNode> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.convert_into(node, &mut out);
        }
        out
    }

    fn convert_into(&self, node: &Node, out: &mut Vec<RenderNode>) {
        match node {
            Node::Root(root) => out.extend(self.convert_all(&root.children)),
            Node::Heading(heading) => out.push(RenderNode::Heading {
                level: heading.depth,
                children: self.convert_all(&heading.children),
            }),
            Node::Paragraph(paragraph) => out.push(RenderNode::Paragraph(self.convert_all(&paragraph.children))),
            Node::List(list) => out.push(RenderNode::List {
                ordered: list.ordered,
                start: if list.ordered { list.start } else { None },
                items: list.children.iter().map(|item| self.list_item(item, list.spread)).collect(),
            }),
            Node::ListItem(_) => out.push(self.list_item(node, false)),
            Node::Blockquote(quote) => out.push(RenderNode::Blockquote(self.convert_all(&quote.children))),
            Node::Link(link) => out.push(RenderNode::Link {
                href: link.url.clone(),
                children: self.convert_all(&link.children),
            }),
            Node::LinkReference(reference) => match self.definitions.get(&reference.identifier) {
                Some(definition) => out.push(RenderNode::Link {
                    href: definition.url.clone(),
                    children: self.convert_all(&reference.children),
                }),
                None => self.literal(node, out),
            },
            Node::Image(image) => out.push(RenderNode::Image {
                src: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
            }),
            Node::ImageReference(reference) => match self.definitions.get(&reference.identifier) {
                Some(definition) => out.push(RenderNode::Image {
                    src: definition.url.clone(),
                    alt: reference.alt.clone(),
                    title: definition.title.clone(),
                }),
                None => self.literal(node, out),
            },
            Node::Table(table) => out.push(RenderNode::Table {
                rows: table.children.iter()
                    .filter_map(|row| match row {
                        Node::TableRow(row) => Some(&row.children),
                        _ => None,
                    })
                    .enumerate()
                    .map(|(index, cells)| TableRow {
                        header: index == 0,
                        cells: cells.iter().map(|cell| match cell {
                            Node::TableCell(cell) => self.convert_all(&cell.children),
                            other => self.convert_all(std::slice::from_ref(other)),
                        }).collect(),
                    })
                    .collect(),
            }),
            Node::Code(code) => out.push(RenderNode::CodeBlock {
                language: code.lang.as_deref().and_then(parse_language),
                text: strip_trailing_newline(&code.value).to_string(),
            }),
            Node::InlineCode(code) => out.push(RenderNode::InlineCode(code.value.clone())),
            Node::Text(text) => out.push(RenderNode::PlainText(text.value.clone())),
            Node::Emphasis(emphasis) => out.push(RenderNode::Emphasis(self.convert_all(&emphasis.children))),
            Node::Strong(strong) => out.push(RenderNode::Strong(self.convert_all(&strong.children))),
            Node::Delete(delete) => out.push(RenderNode::Strikethrough(self.convert_all(&delete.children))),
            Node::Break(_) => out.push(RenderNode::LineBreak),
            Node::ThematicBreak(_) => out.push(RenderNode::ThematicBreak),
            Node::Definition(_) => {}
            Node::Html(html) => {
                // Comments are author notes, any other raw HTML is shown as written
                let value = html.value.trim();
                if !(value.starts_with("<!--") && value.ends_with("-->")) {
                    out.push(RenderNode::PlainText(html.value.clone()));
                }
            }
            other => self.literal(other, out),
        }
    }

    fn list_item(&self, node: &Node, loose_list: bool) -> RenderNode {
        let Node::ListItem(item) = node else {
            let mut children = vec![];
            self.convert_into(node, &mut children);
            return RenderNode::ListItem(children);
        };

        let mut children = vec![];
        if let Some(checked) = item.checked {
            children.push(RenderNode::PlainText(if checked { "[x] " } else { "[ ] " }.to_string()));
        }

        let loose = loose_list || item.spread;
        for child in item.children.iter() {
            match child {
                Node::Paragraph(paragraph) if !loose => children.extend(self.convert_all(&paragraph.children)),
                other => self.convert_into(other, &mut children),
            }
        }
        RenderNode::ListItem(children)
    }

    /// Source text of a construct with no dedicated rendering
    fn literal(&self, node: &Node, out: &mut Vec<RenderNode>) {
        let text = node.position()
            .and_then(|pos| self.source.get(pos.start.offset..pos.end.offset))
            .unwrap_or_default();
        if !text.is_empty() {
            out.push(RenderNode::PlainText(text.to_string()));
        }
    }
}

fn collect_definitions(node: &Node, definitions: &mut HashMap<String, Definition>) {
    if let Node::Definition(definition) = node {
        // First definition wins, as in CommonMark
        definitions.entry(definition.identifier.clone()).or_insert_with(|| Definition {
            url: definition.url.clone(),
            title: definition.title.clone(),
        });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::markup::render_node::{headings, plain_text};
    use crate::test_data::{MARKDOWN_ALL_BLOCKS, POST_EAM};

    use super::*;

    fn text(value: &str) -> RenderNode {
        RenderNode::PlainText(value.to_string())
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let nodes = parse("# Title\n\nSome *text* and **more**.\n\n### Sub\n");
        assert_eq!(nodes, vec![
            RenderNode::Heading { level: 1, children: vec![text("Title")] },
            RenderNode::Paragraph(vec![
                text("Some "),
                RenderNode::Emphasis(vec![text("text")]),
                text(" and "),
                RenderNode::Strong(vec![text("more")]),
                text("."),
            ]),
            RenderNode::Heading { level: 3, children: vec![text("Sub")] },
        ]);
    }

    #[test]
    fn test_tight_list_items_are_inline() {
        let nodes = parse("- **Tier 0:** control\n- Tier 1\n");
        assert_eq!(nodes, vec![RenderNode::List {
            ordered: false,
            start: None,
            items: vec![
                RenderNode::ListItem(vec![
                    RenderNode::Strong(vec![text("Tier 0:")]),
                    text(" control"),
                ]),
                RenderNode::ListItem(vec![text("Tier 1")]),
            ],
        }]);
    }

    #[test]
    fn test_ordered_list_start() {
        let nodes = parse("3. Schema\n4. Application\n");
        match &nodes[0] {
            RenderNode::List { ordered, start, items } => {
                assert!(*ordered);
                assert_eq!(*start, Some(3));
                assert_eq!(items.len(), 2);
            }
            other => panic!("Expected a list, got {:?}", other),
        }
    }

    #[test]
    fn test_code_blocks() {
        let nodes = parse("```powershell\nGet-ADUser -Filter *\n```\n\n```\nplain\n```\n\nUse `repadmin`.\n");
        assert_eq!(nodes, vec![
            RenderNode::CodeBlock { language: Some("powershell".to_string()), text: "Get-ADUser -Filter *".to_string() },
            RenderNode::CodeBlock { language: None, text: "plain".to_string() },
            RenderNode::Paragraph(vec![text("Use "), RenderNode::InlineCode("repadmin".to_string()), text(".")]),
        ]);
    }

    #[test]
    fn test_table_rows() {
        let nodes = parse("| Tool | Use |\n|---|---|\n| dcdiag | health |\n| repadmin | replication |\n");
        let RenderNode::Table { rows } = &nodes[0] else {
            panic!("Expected a table, got {:?}", nodes);
        };
        assert_eq!(rows.len(), 3);
        assert!(rows[0].header);
        assert!(!rows[1].header);
        assert_eq!(rows[2].cells, vec![vec![text("repadmin")], vec![text("replication")]]);
    }

    #[test]
    fn test_links_and_references() {
        let nodes = parse("See [docs](https://learn.microsoft.com) and [ref][1].\n\n[1]: /local/page\n");
        assert_eq!(nodes, vec![RenderNode::Paragraph(vec![
            text("See "),
            RenderNode::Link { href: "https://learn.microsoft.com".to_string(), children: vec![text("docs")] },
            text(" and "),
            RenderNode::Link { href: "/local/page".to_string(), children: vec![text("ref")] },
            text("."),
        ])]);
    }

    #[test]
    fn test_html_comments_dropped_and_raw_html_literal() {
        let nodes = parse("<!-- more -->\n\nText <b>bold</b>\n");
        assert_eq!(plain_text(&nodes), "Text <b>bold</b>");
    }

    #[test]
    fn test_malformed_markdown_is_literal() {
        let nodes = parse("**not closed\n\n[broken](\n\n<!-- never closed\nstill here\n");
        let text = plain_text(&nodes);
        assert!(text.contains("**not closed"));
        assert!(text.contains("[broken]("));
        assert!(text.contains("still here"));
    }

    #[test]
    fn test_blockquote() {
        let nodes = parse("> Note: run as admin\n");
        assert_eq!(nodes, vec![RenderNode::Blockquote(vec![
            RenderNode::Paragraph(vec![text("Note: run as admin")]),
        ])]);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(parse(MARKDOWN_ALL_BLOCKS), parse(MARKDOWN_ALL_BLOCKS));
        assert_eq!(parse(POST_EAM), parse(POST_EAM));
    }

    #[test]
    fn test_heading_order_of_post() {
        let nodes = parse(POST_EAM);
        let found: Vec<String> = headings(&nodes).into_iter().map(|(_, text)| text).collect();
        assert_eq!(found, vec![
            "Enterprise Access Model (EAM)",
            "Legacy Tiering Model",
            "Enterprise Access Model (EAM)",
            "Key Differences and Evolution",
        ]);
    }
}

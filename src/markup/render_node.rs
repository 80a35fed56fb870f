/// One markdown construct, produced fresh on every render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Heading { level: u8, children: Vec<RenderNode> },
    Paragraph(Vec<RenderNode>),
    List { ordered: bool, start: Option<u32>, items: Vec<RenderNode> },
    ListItem(Vec<RenderNode>),
    Blockquote(Vec<RenderNode>),
    Link { href: String, children: Vec<RenderNode> },
    Image { src: String, alt: String, title: Option<String> },
    Table { rows: Vec<TableRow> },
    CodeBlock { language: Option<String>, text: String },
    InlineCode(String),
    Emphasis(Vec<RenderNode>),
    Strong(Vec<RenderNode>),
    Strikethrough(Vec<RenderNode>),
    LineBreak,
    ThematicBreak,
    PlainText(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub header: bool,
    pub cells: Vec<Vec<RenderNode>>,
}

impl RenderNode {
    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Heading { children, .. }
            | RenderNode::Paragraph(children)
            | RenderNode::ListItem(children)
            | RenderNode::Blockquote(children)
            | RenderNode::Link { children, .. }
            | RenderNode::Emphasis(children)
            | RenderNode::Strong(children)
            | RenderNode::Strikethrough(children) => children,
            RenderNode::List { items, .. } => items,
            _ => &[],
        }
    }
}

/// Concatenated text of a node sequence, as a reader would see it.
pub fn plain_text(nodes: &[RenderNode]) -> String {
    let mut text = String::new();
    push_text(nodes, &mut text);
    text
}

fn push_text(nodes: &[RenderNode], text: &mut String) {
    for node in nodes {
        match node {
            RenderNode::PlainText(value) | RenderNode::InlineCode(value) => text.push_str(value),
            RenderNode::Image { alt, .. } => text.push_str(alt),
            RenderNode::LineBreak => text.push(' '),
            RenderNode::Table { rows } => {
                for cell in rows.iter().flat_map(|row| row.cells.iter()) {
                    push_text(cell, text);
                }
            }
            other => push_text(other.children(), text),
        }
    }
}

/// Headings as (level, text) in document order, nested ones included.
pub fn headings(nodes: &[RenderNode]) -> Vec<(u8, String)> {
    let mut found = vec![];
    collect_headings(nodes, &mut found);
    found
}

fn collect_headings(nodes: &[RenderNode], found: &mut Vec<(u8, String)>) {
    for node in nodes {
        match node {
            RenderNode::Heading { level, children } => found.push((*level, plain_text(children))),
            RenderNode::Table { rows } => {
                for cell in rows.iter().flat_map(|row| row.cells.iter()) {
                    collect_headings(cell, found);
                }
            }
            other => collect_headings(other.children(), found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> RenderNode {
        RenderNode::PlainText(value.to_string())
    }

    #[test]
    fn test_plain_text() {
        let nodes = vec![
            text("Run "),
            RenderNode::InlineCode("dcdiag".to_string()),
            RenderNode::Strong(vec![text(" now")]),
        ];
        assert_eq!(plain_text(&nodes), "Run dcdiag now");
    }

    #[test]
    fn test_nested_headings_in_document_order() {
        let nodes = vec![
            RenderNode::Heading { level: 1, children: vec![text("Title")] },
            RenderNode::Blockquote(vec![
                RenderNode::Heading { level: 3, children: vec![text("Quoted")] },
            ]),
            RenderNode::Heading { level: 2, children: vec![text("After")] },
        ];
        assert_eq!(headings(&nodes), vec![
            (1, "Title".to_string()),
            (3, "Quoted".to_string()),
            (2, "After".to_string()),
        ]);
    }
}

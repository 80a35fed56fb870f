use crate::markup::parser::parse;
use crate::markup::render_node::{headings, RenderNode};

/// Render output of one post body, with one anchor slot per heading element
/// in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    nodes: Vec<RenderNode>,
    headings: Vec<(u8, String)>,
    anchors: Vec<Option<String>>,
}

impl Surface {
    pub fn new(nodes: Vec<RenderNode>) -> Surface {
        let headings = headings(&nodes);
        let anchors = vec![None; headings.len()];
        Surface {
            nodes,
            headings,
            anchors,
        }
    }

    pub fn from_markdown(md_text: &str) -> Surface {
        Self::new(parse(md_text))
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    /// (level, text) of every rendered heading
    pub fn headings(&self) -> &[(u8, String)] {
        &self.headings
    }

    pub fn heading_count(&self) -> usize {
        self.headings.len()
    }

    pub fn anchor(&self, index: usize) -> Option<&str> {
        self.anchors.get(index).and_then(|anchor| anchor.as_deref())
    }

    pub fn anchors(&self) -> &[Option<String>] {
        &self.anchors
    }

    /// Overwrites the anchor of the heading at `index`. Out of range indexes
    /// are ignored.
    pub fn set_anchor(&mut self, index: usize, id: &str) -> bool {
        match self.anchors.get_mut(index) {
            Some(anchor) => {
                *anchor = Some(id.to_string());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_slots() {
        let mut surface = Surface::from_markdown("# One\n\ntext\n\n## Two\n");
        assert_eq!(surface.heading_count(), 2);
        assert_eq!(surface.anchor(0), None);

        assert!(surface.set_anchor(1, "two"));
        assert!(!surface.set_anchor(2, "three"));
        assert_eq!(surface.anchor(1), Some("two"));
        assert_eq!(surface.anchors(), &[None, Some("two".to_string())]);
    }
}

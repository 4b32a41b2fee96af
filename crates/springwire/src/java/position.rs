//! Position lookup with graceful degradation.
//!
//! Tier 1 is the tree node itself. Tier 2 scans the source for the first
//! line containing the node's literal text. Tier 3 is the `(0, 0)` sentinel.

use tree_sitter::Node;

use crate::syntax::node_position;
use crate::Position;

/// Line index over one source file.
#[derive(Debug, Clone)]
pub struct PositionLocator<'s> {
    lines: Vec<&'s str>,
}

impl<'s> PositionLocator<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            lines: source.lines().collect(),
        }
    }

    /// Resolve a position, preferring the node and falling back to a text scan.
    pub fn locate(&self, node: Option<&Node>, literal: &str) -> Position {
        node.map(node_position)
            .or_else(|| self.scan(literal))
            .unwrap_or_else(Position::unknown)
    }

    /// First line containing `literal`.
    pub fn scan(&self, literal: &str) -> Option<Position> {
        self.scan_from(literal, 0)
    }

    /// First line at or after `start_line` (0-indexed) containing `literal`.
    pub fn scan_from(&self, literal: &str, start_line: usize) -> Option<Position> {
        let literal = literal.trim();
        if literal.is_empty() {
            return None;
        }
        self.lines
            .iter()
            .enumerate()
            .skip(start_line)
            .find_map(|(idx, line)| {
                line.find(literal)
                    .map(|col| Position::new((idx + 1) as u32, (col + 1) as u32))
            })
    }

    pub fn lines(&self) -> &[&'s str] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{find_child_by_kind, SyntaxTreeAdapter, TreeSitterJava};

    const SOURCE: &str = "package a;\n\npublic class OrderService {\n    private Foo foo;\n}\n";

    #[test]
    fn prefers_node_position() {
        let tree = TreeSitterJava.parse(SOURCE).unwrap();
        let root = tree.root_node();
        let class = find_child_by_kind(&root, "class_declaration").unwrap();
        let locator = PositionLocator::new(SOURCE);
        assert_eq!(locator.locate(Some(&class), "nothing"), Position::new(3, 1));
    }

    #[test]
    fn falls_back_to_text_scan() {
        let locator = PositionLocator::new(SOURCE);
        assert_eq!(locator.locate(None, "Foo foo"), Position::new(4, 13));
    }

    #[test]
    fn falls_back_to_unknown() {
        let locator = PositionLocator::new(SOURCE);
        assert!(locator.locate(None, "missing text").is_unknown());
        assert!(locator.locate(None, "   ").is_unknown());
    }

    #[test]
    fn scan_from_skips_earlier_lines() {
        let locator = PositionLocator::new("foo\nbar\nfoo\n");
        assert_eq!(locator.scan_from("foo", 1), Some(Position::new(3, 1)));
    }
}

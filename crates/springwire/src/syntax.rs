//! The syntax tree adapter: Java source text in, tree-sitter tree out.
//!
//! Extraction code only ever talks to a [`SyntaxTreeAdapter`]; the default
//! implementation wraps `tree-sitter-java`. This module also holds the small
//! node helpers the extractor composes (position conversion, child lookup,
//! syntax-error collection).

use std::cell::RefCell;

use tree_sitter::{Node, Parser, Tree};

use crate::{Position, Range};

/// Failure to produce a usable syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("Java grammar could not be loaded: {0}")]
    LanguageUnavailable(String),

    #[error("Java parser is already in use on this thread")]
    ParserBusy,

    #[error("Parser did not produce a syntax tree")]
    NoTree,

    #[error("Source is not a Java compilation unit (syntax error at {0})")]
    Unrecoverable(Position),
}

/// Converts Java source text into a syntax tree.
pub trait SyntaxTreeAdapter: Send + Sync {
    fn parse(&self, source: &str) -> Result<Tree, AdapterError>;
}

// Thread-local parser reuse - avoids creating a new parser per file
thread_local! {
    static JAVA_PARSER: RefCell<Result<Parser, AdapterError>> = RefCell::new({
        let mut parser = Parser::new();
        match parser.set_language(&tree_sitter_java::LANGUAGE.into()) {
            Ok(()) => Ok(parser),
            Err(e) => Err(AdapterError::LanguageUnavailable(e.to_string())),
        }
    });
}

/// The default adapter, backed by `tree-sitter-java`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterJava;

impl SyntaxTreeAdapter for TreeSitterJava {
    fn parse(&self, source: &str) -> Result<Tree, AdapterError> {
        let tree = JAVA_PARSER.with(|cell| {
            let mut guard = cell.try_borrow_mut().map_err(|_| AdapterError::ParserBusy)?;
            let parser = guard.as_mut().map_err(|e| e.clone())?;
            parser.parse(source, None).ok_or(AdapterError::NoTree)
        })?;

        // tree-sitter recovers from almost anything; a root that is itself an
        // ERROR node means nothing resembling a compilation unit was found.
        let root = tree.root_node();
        if root.is_error() || root.kind() != "program" {
            return Err(AdapterError::Unrecoverable(node_position(&root)));
        }
        Ok(tree)
    }
}

/// A recoverable syntax error found inside an otherwise usable tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SyntaxWarning {
    pub message: String,
    pub position: Position,
}

impl std::fmt::Display for SyntaxWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

/// Maximum recursion depth for helper functions.
const MAX_HELPER_DEPTH: usize = 200;

/// Collect ERROR and MISSING nodes as warnings.
pub fn collect_syntax_warnings(root: &Node, source: &[u8]) -> Vec<SyntaxWarning> {
    let mut warnings = Vec::new();
    if root.has_error() {
        collect_syntax_warnings_with_depth(root, source, &mut warnings, 0);
    }
    warnings
}

fn collect_syntax_warnings_with_depth(
    node: &Node,
    source: &[u8],
    warnings: &mut Vec<SyntaxWarning>,
    depth: usize,
) {
    if depth > MAX_HELPER_DEPTH {
        return;
    }

    if node.is_error() {
        let text = node
            .utf8_text(source)
            .ok()
            .map(|s| s.chars().take(30).collect::<String>())
            .unwrap_or_default();
        let message = if text.trim().is_empty() {
            "Syntax error".to_string()
        } else {
            format!("Syntax error near '{}'", text.trim())
        };
        warnings.push(SyntaxWarning {
            message,
            position: node_position(node),
        });
        // The whole subtree is problematic
        return;
    }

    if node.is_missing() {
        warnings.push(SyntaxWarning {
            message: format!("Expected {}", node.kind()),
            position: node_position(node),
        });
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            collect_syntax_warnings_with_depth(&child, source, warnings, depth + 1);
        }
    }
}

/// Start position of a node, 1-indexed.
pub fn node_position(node: &Node) -> Position {
    let start = node.start_position();
    Position::new((start.row + 1) as u32, (start.column + 1) as u32)
}

/// Start/end span of a node, 1-indexed.
pub fn node_range(node: &Node) -> Range {
    let end = node.end_position();
    Range::new(
        node_position(node),
        Position::new((end.row + 1) as u32, (end.column + 1) as u32),
    )
}

/// Source text covered by a node.
pub fn node_text<'s>(node: &Node, source: &'s [u8]) -> Option<&'s str> {
    node.utf8_text(source).ok()
}

/// Find a child node by its kind.
/// Uses cursor-based iteration for O(n) instead of O(n²) performance.
pub fn find_child_by_kind<'a>(node: &Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            if cursor.node().kind() == kind {
                return Some(cursor.node());
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    None
}

/// All direct children of the given kind, in source order.
pub fn children_by_kind<'a>(node: &Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// First descendant (pre-order, including `node`) satisfying `pred`.
pub fn find_descendant<'a, F>(node: &Node<'a>, pred: &F) -> Option<Node<'a>>
where
    F: Fn(&Node<'a>) -> bool,
{
    find_descendant_with_depth(node, pred, 0)
}

fn find_descendant_with_depth<'a, F>(node: &Node<'a>, pred: &F, depth: usize) -> Option<Node<'a>>
where
    F: Fn(&Node<'a>) -> bool,
{
    if depth > MAX_HELPER_DEPTH {
        return None;
    }
    if pred(node) {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
    children
        .iter()
        .find_map(|child| find_descendant_with_depth(child, pred, depth + 1))
}

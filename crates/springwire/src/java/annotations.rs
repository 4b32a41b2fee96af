//! Annotation classification.
//!
//! Only the Spring and Lombok annotations in [`AnnotationKind`] are
//! materialized; everything else (`@Override`, `@Transactional`, ...) is
//! dropped here so downstream code never sees it.

use tree_sitter::Node;

use crate::model::{AnnotationInfo, AnnotationKind};
use crate::syntax::{find_child_by_kind, find_descendant, node_position, node_text};

/// Classify one annotation by name, reading its argument list if present.
///
/// `name` may be simple (`Service`) or qualified
/// (`org.springframework.stereotype.Service`); the last segment decides.
pub fn classify(
    name: &str,
    arguments: Option<&Node>,
    source: &[u8],
    node: &Node,
) -> Option<AnnotationInfo> {
    let simple = simple_annotation_name(name);
    let kind = AnnotationKind::from_name(simple)?;
    let mut info = AnnotationInfo::new(simple, kind, node_position(node));

    if let Some(value) = arguments.and_then(|args| string_argument(args, source)) {
        info.parameters.insert("value".to_string(), value);
    }

    Some(info)
}

/// Classify every annotation inside a `modifiers` node, in source order.
pub fn classify_modifiers(modifiers: &Node, source: &[u8]) -> Vec<AnnotationInfo> {
    let mut annotations = Vec::new();
    let mut cursor = modifiers.walk();
    for child in modifiers.named_children(&mut cursor) {
        if let Some(info) = classify_node(&child, source) {
            annotations.push(info);
        }
    }
    annotations
}

/// Classify annotations on a declaration that may carry a `modifiers` child.
pub fn annotations_of(declaration: &Node, source: &[u8]) -> Vec<AnnotationInfo> {
    find_child_by_kind(declaration, "modifiers")
        .map(|m| classify_modifiers(&m, source))
        .unwrap_or_default()
}

/// Classify a single `annotation` / `marker_annotation` node.
pub fn classify_node(node: &Node, source: &[u8]) -> Option<AnnotationInfo> {
    if node.kind() != "annotation" && node.kind() != "marker_annotation" {
        return None;
    }
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, source)?;
    let arguments = node.child_by_field_name("arguments");
    classify(name, arguments.as_ref(), source, node)
}

fn simple_annotation_name(name: &str) -> &str {
    let name = name.trim().trim_start_matches('@');
    name.rsplit('.').next().unwrap_or(name).trim()
}

/// Recover the string argument of an annotation.
///
/// Tier 1: the argument list holds exactly one string literal
/// (`@Service("x")`). Tier 2: the first string literal anywhere under the
/// argument list (`@Bean(name = "x")`, `@Qualifier(value = "x")`).
fn string_argument(arguments: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = arguments.walk();
    let values: Vec<Node> = arguments
        .named_children(&mut cursor)
        .filter(|n| !n.kind().ends_with("comment"))
        .collect();

    if let [only] = values.as_slice() {
        if only.kind() == "string_literal" {
            return node_text(only, source).map(unquote);
        }
    }

    let literal = find_descendant(arguments, &|n: &Node| n.kind() == "string_literal")?;
    node_text(&literal, source).map(unquote)
}

/// Strip the quotes from a Java string literal or text block.
fn unquote(literal: &str) -> String {
    let literal = literal.trim();
    let inner = literal
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
        .or_else(|| {
            literal
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
        })
        .unwrap_or(literal);
    inner.trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{SyntaxTreeAdapter, TreeSitterJava};

    fn class_annotations(source: &str) -> Vec<AnnotationInfo> {
        let tree = TreeSitterJava.parse(source).unwrap();
        let root = tree.root_node();
        let class = find_child_by_kind(&root, "class_declaration").unwrap();
        annotations_of(&class, source.as_bytes())
    }

    #[test]
    fn classifies_marker_annotations() {
        let anns = class_annotations("@Service\n@Slf4j\npublic class A {}");
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].kind, AnnotationKind::Service);
        assert_eq!(anns[0].name, "Service");
        assert_eq!(anns[1].kind, AnnotationKind::Slf4j);
        assert!(anns[0].parameters.is_empty());
    }

    #[test]
    fn drops_unknown_annotations() {
        let anns = class_annotations("@Transactional\n@Deprecated\n@Component\nclass A {}");
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].kind, AnnotationKind::Component);
    }

    #[test]
    fn binds_single_string_argument_as_value() {
        let anns = class_annotations("@Service(\"custom\")\nclass A {}");
        assert_eq!(anns[0].value(), Some("custom"));
    }

    #[test]
    fn falls_back_to_first_nested_string_literal() {
        let anns = class_annotations("@Component(value = \"named\", lazy = true)\nclass A {}");
        assert_eq!(anns[0].value(), Some("named"));

        let anns = class_annotations("@Qualifier(value = \"primaryDs\")\nclass A {}");
        assert_eq!(anns[0].kind, AnnotationKind::Qualifier);
        assert_eq!(anns[0].value(), Some("primaryDs"));
    }

    #[test]
    fn non_string_arguments_leave_parameters_empty() {
        let anns = class_annotations("@Configuration(proxyBeanMethods = false)\nclass A {}");
        assert_eq!(anns[0].kind, AnnotationKind::Configuration);
        assert!(anns[0].parameters.is_empty());
    }

    #[test]
    fn qualified_names_classify_by_last_segment() {
        let anns = class_annotations("@org.springframework.stereotype.Repository\nclass A {}");
        assert_eq!(anns[0].kind, AnnotationKind::Repository);
        assert_eq!(anns[0].name, "Repository");
    }

    #[test]
    fn records_annotation_position() {
        let anns = class_annotations("\n  @RestController\nclass A {}");
        assert_eq!(anns[0].line, 2);
        assert_eq!(anns[0].column, 3);
    }

    #[test]
    fn unquote_handles_plain_and_text_block_literals() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote("\"\"\"\nblock\"\"\""), "block");
    }
}

//! Field, constructor and method extraction from a class body.
//!
//! Each function follows a fixed chain of optional child lookups and returns
//! `None` as soon as a link is missing; the caller simply moves on to the
//! next sibling.

use tree_sitter::Node;

use super::annotations::{annotations_of, classify_modifiers};
use super::position::PositionLocator;
use crate::model::{
    is_setter_shape, AnnotationKind, ConstructorInfo, FieldInfo, MethodInfo, ParameterInfo,
};
use crate::syntax::{find_child_by_kind, node_range, node_text};
use crate::Visibility;

/// Modifier keywords relevant to injection analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Modifiers {
    pub visibility: Visibility,
    pub is_final: bool,
    pub is_static: bool,
}

/// Read visibility and `final`/`static` from a declaration's `modifiers` child.
pub(crate) fn modifiers_of(declaration: &Node) -> Modifiers {
    let mut modifiers = Modifiers::default();
    let Some(node) = find_child_by_kind(declaration, "modifiers") else {
        return modifiers;
    };
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "public" => modifiers.visibility = Visibility::Public,
            "protected" => modifiers.visibility = Visibility::Protected,
            "private" => modifiers.visibility = Visibility::Private,
            "final" => modifiers.is_final = true,
            "static" => modifiers.is_static = true,
            _ => {}
        }
    }
    modifiers
}

/// Collapse whitespace runs in type text (`Map<String,\n  Foo>` -> `Map<String, Foo>`).
pub(crate) fn type_text(node: &Node, source: &[u8]) -> Option<String> {
    let text = node_text(node, source)?;
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Extract every declarator of a `field_declaration` (`private A a, b;` yields two fields).
pub(crate) fn extract_fields(
    node: &Node,
    source: &[u8],
    locator: &PositionLocator,
) -> Vec<FieldInfo> {
    let Some(type_node) = node.child_by_field_name("type") else {
        return Vec::new();
    };
    let Some(base_type) = type_text(&type_node, source) else {
        return Vec::new();
    };
    let modifiers = modifiers_of(node);
    let annotations = annotations_of(node, source);
    let range = node_range(node);

    let mut cursor = node.walk();
    node.children_by_field_name("declarator", &mut cursor)
        .filter_map(|declarator| {
            let name_node = declarator.child_by_field_name("name")?;
            let name = node_text(&name_node, source)?.to_string();
            let field_type = match declarator.child_by_field_name("dimensions") {
                Some(dims) => format!("{}{}", base_type, node_text(&dims, source)?),
                None => base_type.clone(),
            };
            Some(FieldInfo {
                position: locator.locate(Some(&name_node), &name),
                name,
                field_type,
                range,
                annotations: annotations.clone(),
                visibility: Some(modifiers.visibility),
                is_final: modifiers.is_final,
                is_static: modifiers.is_static,
            })
        })
        .collect()
}

/// Extract a `constructor_declaration`.
pub(crate) fn extract_constructor(
    node: &Node,
    source: &[u8],
    class_name: &str,
    locator: &PositionLocator,
) -> Option<ConstructorInfo> {
    let params = node.child_by_field_name("parameters")?;
    let parameters = extract_parameters(&params, source, locator);
    let annotations = annotations_of(node, source);
    let name_node = node.child_by_field_name("name");

    Some(ConstructorInfo {
        parameters,
        position: locator.locate(name_node.as_ref(), &format!("{}(", class_name)),
        range: node_range(node),
        has_autowired_annotation: annotations
            .iter()
            .any(|a| a.kind == AnnotationKind::Autowired),
        visibility: Some(modifiers_of(node).visibility),
    })
}

/// Extract a `method_declaration`.
pub(crate) fn extract_method(
    node: &Node,
    source: &[u8],
    locator: &PositionLocator,
) -> Option<MethodInfo> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, source)?.to_string();
    let params = node.child_by_field_name("parameters")?;
    let parameters = extract_parameters(&params, source, locator);
    let return_type = node
        .child_by_field_name("type")
        .and_then(|t| type_text(&t, source));

    Some(MethodInfo {
        is_setter_method: is_setter_shape(&name, parameters.len()),
        position: locator.locate(Some(&name_node), &name),
        name,
        parameters,
        range: node_range(node),
        annotations: annotations_of(node, source),
        visibility: Some(modifiers_of(node).visibility),
        return_type,
    })
}

/// Extract the parameters of a `formal_parameters` node, in order.
pub(crate) fn extract_parameters(
    params: &Node,
    source: &[u8],
    locator: &PositionLocator,
) -> Vec<ParameterInfo> {
    let mut cursor = params.walk();
    let nodes: Vec<Node> = params
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "formal_parameter" || n.kind() == "spread_parameter")
        .collect();

    nodes
        .iter()
        .filter_map(|node| match node.kind() {
            "formal_parameter" => formal_parameter(node, source, locator),
            _ => spread_parameter(node, source, locator),
        })
        .enumerate()
        .map(|(index, mut param)| {
            param.index = Some(index);
            param
        })
        .collect()
}

fn formal_parameter(
    node: &Node,
    source: &[u8],
    locator: &PositionLocator,
) -> Option<ParameterInfo> {
    let type_node = node.child_by_field_name("type")?;
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, source)?;
    let mut param_type = type_text(&type_node, source)?;
    if let Some(dims) = node.child_by_field_name("dimensions") {
        param_type.push_str(node_text(&dims, source)?);
    }

    let mut param = ParameterInfo::new(name, param_type);
    param.position = Some(locator.locate(Some(&name_node), name));
    param.range = Some(node_range(node));
    param.annotations = find_child_by_kind(node, "modifiers")
        .map(|m| classify_modifiers(&m, source))
        .unwrap_or_default();
    Some(param)
}

/// `String... names`: the declarator carries the name, the type is a bare child.
fn spread_parameter(
    node: &Node,
    source: &[u8],
    locator: &PositionLocator,
) -> Option<ParameterInfo> {
    let declarator = find_child_by_kind(node, "variable_declarator")?;
    let name_node = declarator.child_by_field_name("name")?;
    let name = node_text(&name_node, source)?;

    let mut cursor = node.walk();
    let type_node = node
        .named_children(&mut cursor)
        .find(|n| n.kind() != "modifiers" && n.kind() != "variable_declarator")?;
    let param_type = format!("{}...", type_text(&type_node, source)?);

    let mut param = ParameterInfo::new(name, param_type);
    param.position = Some(locator.locate(Some(&name_node), name));
    param.range = Some(node_range(node));
    param.annotations = find_child_by_kind(node, "modifiers")
        .map(|m| classify_modifiers(&m, source))
        .unwrap_or_default();
    Some(param)
}

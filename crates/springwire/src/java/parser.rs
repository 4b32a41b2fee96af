//! Compilation-unit walking: package, imports and class declarations.

use std::path::Path;

use tree_sitter::Node;

use super::annotations::annotations_of;
use super::members::{extract_constructor, extract_fields, extract_method};
use super::position::PositionLocator;
use crate::model::{erase_generics, ClassInfo};
use crate::syntax::{children_by_kind, find_child_by_kind, node_range, node_text};

/// Per-file context shared by every class in the compilation unit.
struct Unit<'a> {
    file: &'a Path,
    source: &'a [u8],
    package: Option<String>,
    imports: Vec<String>,
    locator: PositionLocator<'a>,
}

/// Extract every class declared in a `program` node, outer classes before
/// the classes nested in them.
pub(crate) fn extract_classes(root: &Node, source: &str, file: &Path) -> Vec<ClassInfo> {
    let bytes = source.as_bytes();
    let unit = Unit {
        file,
        source: bytes,
        package: find_child_by_kind(root, "package_declaration")
            .and_then(|decl| qualified_name(&decl, bytes)),
        imports: children_by_kind(root, "import_declaration")
            .iter()
            .filter_map(|decl| import_path(decl, bytes))
            .collect(),
        locator: PositionLocator::new(source),
    };

    let mut classes = Vec::new();
    for decl in children_by_kind(root, "class_declaration") {
        extract_class(&decl, &unit, None, &mut classes);
    }
    classes
}

fn extract_class(node: &Node, unit: &Unit, outer: Option<&str>, out: &mut Vec<ClassInfo>) {
    let Some(name_node) = node.child_by_field_name("name") else {
        tracing::debug!("Skipping class declaration without a name in {}", unit.file.display());
        return;
    };
    let Some(name) = node_text(&name_node, unit.source) else {
        return;
    };

    let scope = match (outer, unit.package.as_deref()) {
        (Some(outer), _) => outer.to_string(),
        (None, Some(pkg)) => pkg.to_string(),
        (None, None) => String::new(),
    };
    let fully_qualified_name = if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    };

    let mut class = ClassInfo {
        name: name.to_string(),
        package_name: unit.package.clone(),
        fully_qualified_name,
        file_ref: unit.file.to_path_buf(),
        position: unit.locator.locate(Some(&name_node), name),
        range: node_range(node),
        annotations: annotations_of(node, unit.source),
        fields: Vec::new(),
        constructors: Vec::new(),
        methods: Vec::new(),
        interfaces: interfaces_of(node, unit.source),
        imports: unit.imports.clone(),
    };

    let mut nested = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "field_declaration" => {
                    class
                        .fields
                        .extend(extract_fields(&member, unit.source, &unit.locator));
                }
                "constructor_declaration" => {
                    match extract_constructor(&member, unit.source, name, &unit.locator) {
                        Some(ctor) => class.constructors.push(ctor),
                        None => tracing::debug!("Skipping malformed constructor in {}", name),
                    }
                }
                "method_declaration" => match extract_method(&member, unit.source, &unit.locator) {
                    Some(method) => class.methods.push(method),
                    None => tracing::debug!("Skipping malformed method in {}", name),
                },
                "class_declaration" => nested.push(member),
                _ => {}
            }
        }
    }

    let fqn = class.fully_qualified_name.clone();
    out.push(class);
    for inner in nested {
        extract_class(&inner, unit, Some(&fqn), out);
    }
}

/// Implemented interface names from the `implements` clause, generics stripped.
fn interfaces_of(class: &Node, source: &[u8]) -> Vec<String> {
    let Some(clause) = class.child_by_field_name("interfaces") else {
        return Vec::new();
    };
    let Some(list) = find_child_by_kind(&clause, "type_list") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter_map(|ty| node_text(&ty, source))
        .map(|text| erase_generics(text).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Dotted name of a package declaration, joined from its identifier tokens.
fn qualified_name(decl: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = decl.walk();
    let name = decl
        .named_children(&mut cursor)
        .find(|n| n.kind() == "scoped_identifier" || n.kind() == "identifier")?;
    let mut parts = Vec::new();
    collect_identifiers(&name, source, &mut parts);
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// `import a.b.C;` -> `a.b.C`, `import a.b.*;` -> `a.b.*`.
fn import_path(decl: &Node, source: &[u8]) -> Option<String> {
    let path = qualified_name(decl, source)?;
    if find_child_by_kind(decl, "asterisk").is_some() {
        Some(format!("{}.*", path))
    } else {
        Some(path)
    }
}

fn collect_identifiers<'s>(node: &Node, source: &'s [u8], out: &mut Vec<&'s str>) {
    if node.kind() == "identifier" {
        if let Some(text) = node_text(node, source) {
            out.push(text);
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_identifiers(&child, source, out);
    }
}

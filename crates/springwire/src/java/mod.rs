//! Structural extraction: Java source text to [`ClassInfo`] records.
//!
//! Extraction never fails outright. An adapter failure becomes a single error
//! string with no classes; recoverable syntax errors become warnings and the
//! rest of the file is still extracted.

pub mod annotations;
mod members;
mod parser;
pub mod position;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ClassInfo;
use crate::syntax::{collect_syntax_warnings, SyntaxTreeAdapter, SyntaxWarning, TreeSitterJava};

/// Output of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub classes: Vec<ClassInfo>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SyntaxWarning>,
}

impl ExtractionResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Extracts classes through a [`SyntaxTreeAdapter`].
#[derive(Debug, Clone, Default)]
pub struct JavaExtractor<A: SyntaxTreeAdapter = TreeSitterJava> {
    adapter: A,
}

impl JavaExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: SyntaxTreeAdapter> JavaExtractor<A> {
    pub fn with_adapter(adapter: A) -> Self {
        Self { adapter }
    }

    /// Extract every class in `source`. `file` is recorded as each class's `file_ref`.
    pub fn extract(&self, file: &Path, source: &str) -> ExtractionResult {
        let tree = match self.adapter.parse(source) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", file.display(), e);
                return ExtractionResult {
                    errors: vec![e.to_string()],
                    ..Default::default()
                };
            }
        };

        let root = tree.root_node();
        ExtractionResult {
            classes: parser::extract_classes(&root, source, file),
            errors: Vec::new(),
            warnings: collect_syntax_warnings(&root, source.as_bytes()),
        }
    }
}

/// Extract with the default tree-sitter adapter.
pub fn extract(file: &Path, source: &str) -> ExtractionResult {
    JavaExtractor::new().extract(file, source)
}

/// Read and extract a file from disk, failing if no tree could be built.
pub fn extract_file(path: &Path) -> crate::Result<Vec<ClassInfo>> {
    let source = std::fs::read_to_string(path)?;
    let result = extract(path, &source);
    if result.is_ok() {
        Ok(result.classes)
    } else {
        Err(crate::Error::Parse {
            path: path.to_path_buf(),
            message: result.errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationKind;
    use crate::syntax::AdapterError;
    use crate::{Position, Visibility};
    use tree_sitter::Tree;

    const ORDER_SERVICE: &str = r#"package com.example.shop;

import com.example.shop.repo.UserRepository;
import com.example.mail.*;
import static java.util.Objects.requireNonNull;

@Service
public class OrderService implements OrderApi, Handler<Order> {
    private final UserRepository userRepository;
    private final EmailService emailService;

    public OrderService(UserRepository userRepository, EmailService emailService) {
        this.userRepository = userRepository;
        this.emailService = emailService;
    }

    @Autowired
    public void setAuditLog(AuditLog auditLog) {}

    public void placeOrder(Order order) {}
}
"#;

    fn extract_str(source: &str) -> ExtractionResult {
        extract(Path::new("src/OrderService.java"), source)
    }

    #[test]
    fn extracts_order_service() {
        let result = extract_str(ORDER_SERVICE);
        assert!(result.is_ok());
        assert!(result.warnings.is_empty());
        assert_eq!(result.classes.len(), 1);

        let class = &result.classes[0];
        assert_eq!(class.name, "OrderService");
        assert_eq!(class.package_name.as_deref(), Some("com.example.shop"));
        assert_eq!(class.fully_qualified_name, "com.example.shop.OrderService");
        assert_eq!(class.file_ref, Path::new("src/OrderService.java"));
        assert_eq!(class.position, Position::new(8, 14));
        assert!(class.has_annotation(AnnotationKind::Service));
        assert_eq!(
            class.imports,
            vec![
                "com.example.shop.repo.UserRepository",
                "com.example.mail.*",
                "java.util.Objects.requireNonNull",
            ]
        );
        assert_eq!(class.interfaces, vec!["OrderApi", "Handler"]);

        assert_eq!(class.fields.len(), 2);
        assert_eq!(class.fields[0].field_type, "UserRepository");
        assert!(class.fields[0].is_final);

        assert_eq!(class.constructors.len(), 1);
        let ctor = &class.constructors[0];
        assert!(!ctor.has_autowired_annotation);
        assert_eq!(ctor.visibility, Some(Visibility::Public));
        let types: Vec<_> = ctor.parameters.iter().map(|p| p.param_type.as_str()).collect();
        assert_eq!(types, vec!["UserRepository", "EmailService"]);

        assert_eq!(class.methods.len(), 2);
        assert!(class.methods[0].is_setter_method);
        assert!(!class.methods[1].is_setter_method);
    }

    #[test]
    fn extraction_is_idempotent() {
        let first = extract_str(ORDER_SERVICE);
        let second = extract_str(ORDER_SERVICE);
        assert_eq!(first, second);
    }

    #[test]
    fn extracts_nested_classes_with_qualified_names() {
        let source = r#"
package a;

@Configuration
public class Outer {
    @Component
    static class Inner {
        private Foo foo;
    }
}
"#;
        let result = extract_str(source);
        let names: Vec<_> = result
            .classes
            .iter()
            .map(|c| c.fully_qualified_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.Outer", "a.Outer.Inner"]);
        assert!(result.classes[0].fields.is_empty());
        assert_eq!(result.classes[1].fields.len(), 1);
    }

    #[test]
    fn interfaces_are_not_classes() {
        let result = extract_str("package a;\npublic interface Repo {}\nclass Impl implements Repo {}");
        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.classes[0].name, "Impl");
    }

    #[test]
    fn default_package_uses_simple_name() {
        let result = extract_str("class Plain {}");
        assert_eq!(result.classes[0].package_name, None);
        assert_eq!(result.classes[0].fully_qualified_name, "Plain");
    }

    #[test]
    fn recoverable_errors_are_warnings() {
        let source = "package a;\n@Service\nclass A {\n    private Foo foo = ;\n    private Bar bar;\n}\n";
        let result = extract_str(source);
        assert!(result.is_ok());
        assert!(!result.warnings.is_empty());
        assert_eq!(result.classes.len(), 1);
    }

    struct FailingAdapter;

    impl SyntaxTreeAdapter for FailingAdapter {
        fn parse(&self, _source: &str) -> Result<Tree, AdapterError> {
            Err(AdapterError::NoTree)
        }
    }

    #[test]
    fn extract_file_reads_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("OrderService.java");
        std::fs::write(&path, ORDER_SERVICE).unwrap();
        let classes = extract_file(&path).unwrap();
        assert_eq!(classes[0].file_ref, path);

        let missing = extract_file(&temp.path().join("Missing.java"));
        assert!(matches!(missing, Err(crate::Error::Io(_))));
    }

    #[test]
    fn adapter_failure_yields_single_error() {
        let extractor = JavaExtractor::with_adapter(FailingAdapter);
        let result = extractor.extract(Path::new("A.java"), ORDER_SERVICE);
        assert!(result.classes.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("syntax tree"));
    }
}

//! Domain records produced by extraction, detection and bean discovery.
//!
//! Everything here is plain data: the extractor creates [`ClassInfo`] values,
//! detectors read them and emit [`InjectionInfo`] values, and the registry
//! stores [`BeanDefinition`] values. Wire names are camelCase so JSON output
//! matches the shapes integrators expect.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Position, Range, Visibility};

/// The closed vocabulary of annotations the classifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationKind {
    Component,
    Service,
    Repository,
    Controller,
    RestController,
    Configuration,
    Bean,
    Autowired,
    Qualifier,
    Value,
    RequiredArgsConstructor,
    AllArgsConstructor,
    NoArgsConstructor,
    Data,
    Slf4j,
    NonNull,
}

impl AnnotationKind {
    /// Map a simple annotation name (`Service`, not `@Service`) to its kind.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Component" => AnnotationKind::Component,
            "Service" => AnnotationKind::Service,
            "Repository" => AnnotationKind::Repository,
            "Controller" => AnnotationKind::Controller,
            "RestController" => AnnotationKind::RestController,
            "Configuration" => AnnotationKind::Configuration,
            "Bean" => AnnotationKind::Bean,
            "Autowired" => AnnotationKind::Autowired,
            "Qualifier" => AnnotationKind::Qualifier,
            "Value" => AnnotationKind::Value,
            "RequiredArgsConstructor" => AnnotationKind::RequiredArgsConstructor,
            "AllArgsConstructor" => AnnotationKind::AllArgsConstructor,
            "NoArgsConstructor" => AnnotationKind::NoArgsConstructor,
            "Data" => AnnotationKind::Data,
            "Slf4j" => AnnotationKind::Slf4j,
            "NonNull" => AnnotationKind::NonNull,
            _ => return None,
        };
        Some(kind)
    }

    /// The simple annotation name as written in source.
    pub fn simple_name(&self) -> &'static str {
        match self {
            AnnotationKind::Component => "Component",
            AnnotationKind::Service => "Service",
            AnnotationKind::Repository => "Repository",
            AnnotationKind::Controller => "Controller",
            AnnotationKind::RestController => "RestController",
            AnnotationKind::Configuration => "Configuration",
            AnnotationKind::Bean => "Bean",
            AnnotationKind::Autowired => "Autowired",
            AnnotationKind::Qualifier => "Qualifier",
            AnnotationKind::Value => "Value",
            AnnotationKind::RequiredArgsConstructor => "RequiredArgsConstructor",
            AnnotationKind::AllArgsConstructor => "AllArgsConstructor",
            AnnotationKind::NoArgsConstructor => "NoArgsConstructor",
            AnnotationKind::Data => "Data",
            AnnotationKind::Slf4j => "Slf4j",
            AnnotationKind::NonNull => "NonNull",
        }
    }

    pub fn is_lombok(&self) -> bool {
        matches!(
            self,
            AnnotationKind::RequiredArgsConstructor
                | AnnotationKind::AllArgsConstructor
                | AnnotationKind::NoArgsConstructor
                | AnnotationKind::Data
                | AnnotationKind::Slf4j
                | AnnotationKind::NonNull
        )
    }

    /// Stereotypes that turn the annotated class into a bean.
    pub fn is_stereotype(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Component
                | AnnotationKind::Service
                | AnnotationKind::Repository
                | AnnotationKind::Controller
                | AnnotationKind::RestController
                | AnnotationKind::Configuration
        )
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.simple_name())
    }
}

/// A recognized annotation occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationInfo {
    /// Simple name as written (`Service` for `@org.springframework.stereotype.Service`)
    pub name: String,
    pub kind: AnnotationKind,
    pub line: u32,
    pub column: u32,
    /// Literal parameters; the recovered string argument is bound under `"value"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl AnnotationInfo {
    pub fn new(name: impl Into<String>, kind: AnnotationKind, position: Position) -> Self {
        Self {
            name: name.into(),
            kind,
            line: position.line,
            column: position.column,
            parameters: BTreeMap::new(),
        }
    }

    /// Attach a `"value"` parameter.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.parameters.insert("value".to_string(), value.into());
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// The `"value"` parameter, ignoring blank strings.
    pub fn value(&self) -> Option<&str> {
        self.parameters
            .get("value")
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

fn find_annotation(annotations: &[AnnotationInfo], kind: AnnotationKind) -> Option<&AnnotationInfo> {
    annotations.iter().find(|a| a.kind == kind)
}

/// A field declared in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    /// Raw type text, generics preserved (`List<Foo>`)
    #[serde(rename = "type")]
    pub field_type: String,
    pub position: Position,
    pub range: Range,
    pub annotations: Vec<AnnotationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub is_final: bool,
    pub is_static: bool,
}

impl FieldInfo {
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&AnnotationInfo> {
        find_annotation(&self.annotations, kind)
    }

    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotation(kind).is_some()
    }

    /// `final` or `@NonNull`: the fields Lombok treats as required.
    pub fn is_required(&self) -> bool {
        self.is_final || self.has_annotation(AnnotationKind::NonNull)
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.annotation(AnnotationKind::Qualifier)
            .and_then(AnnotationInfo::value)
    }
}

/// A constructor or method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<AnnotationInfo>,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            position: None,
            range: None,
            index: None,
            annotations: Vec::new(),
        }
    }

    pub fn qualifier(&self) -> Option<&str> {
        find_annotation(&self.annotations, AnnotationKind::Qualifier)
            .and_then(AnnotationInfo::value)
    }
}

/// A constructor declared in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorInfo {
    pub parameters: Vec<ParameterInfo>,
    pub position: Position,
    pub range: Range,
    pub has_autowired_annotation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// A method declared in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<ParameterInfo>,
    pub position: Position,
    pub range: Range,
    pub annotations: Vec<AnnotationInfo>,
    /// Structural judgment only: `setXxx` with exactly one parameter
    pub is_setter_method: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

impl MethodInfo {
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&AnnotationInfo> {
        find_annotation(&self.annotations, kind)
    }

    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotation(kind).is_some()
    }
}

/// `name` matches `set[A-Z]...` and there is exactly one parameter.
pub fn is_setter_shape(name: &str, parameter_count: usize) -> bool {
    let mut rest = match name.strip_prefix("set") {
        Some(rest) => rest.chars(),
        None => return false,
    };
    parameter_count == 1 && rest.next().is_some_and(|c| c.is_ascii_uppercase())
}

/// A class extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    pub fully_qualified_name: String,
    pub file_ref: PathBuf,
    pub position: Position,
    pub range: Range,
    pub annotations: Vec<AnnotationInfo>,
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    /// Implemented interface names, generics stripped
    #[serde(default)]
    pub interfaces: Vec<String>,
    pub imports: Vec<String>,
}

impl ClassInfo {
    pub fn annotation(&self, kind: AnnotationKind) -> Option<&AnnotationInfo> {
        find_annotation(&self.annotations, kind)
    }

    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotation(kind).is_some()
    }

    /// The first stereotype annotation (`@Service`, `@Component`, ...), if any.
    pub fn stereotype(&self) -> Option<&AnnotationInfo> {
        self.annotations.iter().find(|a| a.kind.is_stereotype())
    }
}

/// A constructor Lombok would generate at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualConstructorInfo {
    pub parameters: Vec<ParameterInfo>,
    pub range: Range,
    pub lombok_kind: AnnotationKind,
    /// The annotation text that requested it (`@RequiredArgsConstructor`)
    pub annotation_source: String,
    pub visibility: Visibility,
    pub is_virtual: bool,
    pub position: Position,
}

/// How a dependency is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InjectionKind {
    Field,
    Constructor,
    Setter,
    ConstructorLombok,
    BeanMethod,
}

impl std::fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectionKind::Field => write!(f, "field"),
            InjectionKind::Constructor => write!(f, "constructor"),
            InjectionKind::Setter => write!(f, "setter"),
            InjectionKind::ConstructorLombok => write!(f, "lombok constructor"),
            InjectionKind::BeanMethod => write!(f, "bean method"),
        }
    }
}

/// A dependency-injection site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionInfo {
    pub target_type: String,
    pub injection_kind: InjectionKind,
    pub position: Position,
    pub range: Range,
    pub target_name: String,
    /// Name from a `@Qualifier` on the injection site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// Fully qualified name of the class that declares the injection site
    pub owner_class: String,
    pub file_ref: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_bean: Option<BeanDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_beans: Option<Vec<BeanDefinition>>,
}

impl InjectionInfo {
    pub fn new(
        injection_kind: InjectionKind,
        owner: &ClassInfo,
        target_type: impl Into<String>,
        target_name: impl Into<String>,
        position: Position,
        range: Range,
    ) -> Self {
        Self {
            target_type: target_type.into(),
            injection_kind,
            position,
            range,
            target_name: target_name.into(),
            qualifier: None,
            owner_class: owner.fully_qualified_name.clone(),
            file_ref: owner.file_ref.clone(),
            resolved_bean: None,
            candidate_beans: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: Option<&str>) -> Self {
        self.qualifier = qualifier.map(str::to_string);
        self
    }

    /// The name used to break ties between candidates: the qualifier when
    /// present, otherwise the field/parameter name.
    pub fn name_hint(&self) -> &str {
        self.qualifier.as_deref().unwrap_or(&self.target_name)
    }
}

/// Where a bean comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeanDefinitionKind {
    /// A stereotype-annotated class
    Class,
    /// A `@Bean` factory method
    Method,
}

/// A bean located in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeanDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub bean_type: String,
    pub implementation_class_fqn: String,
    pub file_ref: PathBuf,
    pub position: Position,
    pub definition_kind: BeanDefinitionKind,
    pub annotation_kind: AnnotationKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
}

impl BeanDefinition {
    pub fn new(
        name: impl Into<String>,
        bean_type: impl Into<String>,
        definition_kind: BeanDefinitionKind,
        annotation_kind: AnnotationKind,
    ) -> Self {
        let bean_type = bean_type.into();
        Self {
            name: name.into(),
            implementation_class_fqn: bean_type.clone(),
            bean_type,
            file_ref: PathBuf::new(),
            position: Position::unknown(),
            definition_kind,
            annotation_kind,
            interfaces: Vec::new(),
        }
    }

    pub fn with_interfaces(mut self, interfaces: Vec<String>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_location(mut self, file_ref: PathBuf, position: Position) -> Self {
        self.file_ref = file_ref;
        self.position = position;
        self
    }
}

/// Strip generic arguments from a type: `Step<AddUgcContext>` -> `Step`.
pub fn erase_generics(ty: &str) -> &str {
    ty.split('<').next().unwrap_or(ty).trim()
}

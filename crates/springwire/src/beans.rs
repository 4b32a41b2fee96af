//! Bean discovery from extracted classes.
//!
//! Two sources of beans are recognized:
//! - Classes annotated with a stereotype (`@Component`, `@Service`, ...)
//! - `@Bean` factory methods declared in such classes

use crate::model::{
    erase_generics, AnnotationKind, BeanDefinition, BeanDefinitionKind, ClassInfo, MethodInfo,
};

/// Whether Spring would register beans from `class` (stereotype or `@Configuration`).
pub fn declares_beans(class: &ClassInfo) -> bool {
    class.stereotype().is_some()
}

/// Every bean defined in `classes`, class beans before their factory-method beans.
pub fn discover_beans(classes: &[ClassInfo]) -> Vec<BeanDefinition> {
    let mut beans = Vec::new();
    for class in classes {
        let Some(stereotype) = class.stereotype() else {
            continue;
        };

        let name = stereotype
            .value()
            .map(str::to_string)
            .unwrap_or_else(|| decapitalize(&class.name));
        beans.push(BeanDefinition {
            implementation_class_fqn: class.fully_qualified_name.clone(),
            ..BeanDefinition::new(name, &class.name, BeanDefinitionKind::Class, stereotype.kind)
                .with_interfaces(class.interfaces.clone())
                .with_location(class.file_ref.clone(), class.position)
        });

        for method in &class.methods {
            if let Some(bean) = method_bean(class, method) {
                beans.push(bean);
            }
        }
    }
    beans
}

fn method_bean(class: &ClassInfo, method: &MethodInfo) -> Option<BeanDefinition> {
    let annotation = method.annotation(AnnotationKind::Bean)?;
    let return_type = method.return_type.as_deref().filter(|t| *t != "void")?;
    let name = annotation
        .value()
        .map(str::to_string)
        .unwrap_or_else(|| method.name.clone());

    Some(BeanDefinition {
        implementation_class_fqn: qualify_type(class, return_type),
        ..BeanDefinition::new(name, return_type, BeanDefinitionKind::Method, AnnotationKind::Bean)
            .with_location(class.file_ref.clone(), method.position)
    })
}

/// Qualify a type name through the file's imports, falling back to its package.
pub fn qualify_type(class: &ClassInfo, type_text: &str) -> String {
    let simple = erase_generics(type_text);
    if simple.contains('.') {
        return simple.to_string();
    }
    let suffix = format!(".{}", simple);
    if let Some(import) = class.imports.iter().find(|i| i.ends_with(&suffix)) {
        return import.clone();
    }
    match class.package_name.as_deref() {
        Some(pkg) if !is_builtin(simple) => format!("{}.{}", pkg, simple),
        _ => simple.to_string(),
    }
}

fn is_builtin(simple: &str) -> bool {
    matches!(
        simple,
        "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double"
            | "String" | "Object" | "Integer" | "Long" | "Boolean" | "Double"
    )
}

/// Spring's default bean name: lower-case the first character unless the
/// first two are both upper-case (`UserService` -> `userService`, `URLParser` stays).
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if chars.next().is_some_and(char::is_uppercase) && first.is_uppercase() {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    out.extend(first.to_lowercase());
    out.push_str(&name[first.len_utf8()..]);
    out
}

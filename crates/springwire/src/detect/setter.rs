use crate::model::{AnnotationKind, ClassInfo, InjectionInfo, InjectionKind};

use super::{parameter_injections, InjectionDetector};

/// `@Autowired` methods with setter shape (`setXxx`, one parameter).
#[derive(Debug, Clone, Copy, Default)]
pub struct SetterInjectionDetector;

impl InjectionDetector for SetterInjectionDetector {
    fn detect(&self, classes: &[ClassInfo]) -> Vec<InjectionInfo> {
        let mut injections = Vec::new();
        for class in classes {
            for method in &class.methods {
                if method.is_setter_method && method.has_annotation(AnnotationKind::Autowired) {
                    injections.extend(parameter_injections(
                        InjectionKind::Setter,
                        class,
                        &method.parameters,
                        method.position,
                        method.range,
                    ));
                }
            }
        }
        injections
    }
}

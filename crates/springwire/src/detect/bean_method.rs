use crate::beans::declares_beans;
use crate::model::{AnnotationKind, ClassInfo, InjectionInfo, InjectionKind};

use super::{parameter_injections, InjectionDetector};

/// Parameters of `@Bean` factory methods, which Spring resolves like
/// constructor arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeanMethodInjectionDetector;

impl InjectionDetector for BeanMethodInjectionDetector {
    fn detect(&self, classes: &[ClassInfo]) -> Vec<InjectionInfo> {
        classes
            .iter()
            .filter(|class| declares_beans(class))
            .flat_map(|class| {
                class
                    .methods
                    .iter()
                    .filter(|m| m.has_annotation(AnnotationKind::Bean))
                    .flat_map(move |method| {
                        parameter_injections(
                            InjectionKind::BeanMethod,
                            class,
                            &method.parameters,
                            method.position,
                            method.range,
                        )
                    })
            })
            .collect()
    }
}

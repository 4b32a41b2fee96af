use crate::model::{ClassInfo, ConstructorInfo, InjectionInfo, InjectionKind};

use super::{parameter_injections, InjectionDetector};

/// Constructor parameters Spring would autowire.
///
/// A lone constructor is autowired implicitly. With several constructors only
/// the first `@Autowired` one counts; if none is annotated there is nothing
/// to report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructorInjectionDetector;

impl ConstructorInjectionDetector {
    /// The constructor Spring would pick for `class`, if any.
    pub fn injection_constructor(class: &ClassInfo) -> Option<&ConstructorInfo> {
        match class.constructors.as_slice() {
            [] => None,
            [only] => Some(only),
            many => many.iter().find(|c| c.has_autowired_annotation),
        }
    }
}

impl InjectionDetector for ConstructorInjectionDetector {
    fn detect(&self, classes: &[ClassInfo]) -> Vec<InjectionInfo> {
        classes
            .iter()
            .filter_map(|class| Some((class, Self::injection_constructor(class)?)))
            .flat_map(|(class, ctor)| {
                parameter_injections(
                    InjectionKind::Constructor,
                    class,
                    &ctor.parameters,
                    ctor.position,
                    ctor.range,
                )
            })
            .collect()
    }
}

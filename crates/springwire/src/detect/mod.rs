//! Injection-site detection.
//!
//! Each detector is independent: it reads extracted classes and reports the
//! injection sites of one kind. Callers combine whichever detectors they need.

mod bean_method;
mod constructor;
mod field;
pub mod lombok;
mod setter;

pub use bean_method::BeanMethodInjectionDetector;
pub use constructor::ConstructorInjectionDetector;
pub use field::FieldInjectionDetector;
pub use lombok::{LombokFieldAnalysis, LombokInjectionDetector, LombokSimulationResult};
pub use setter::SetterInjectionDetector;

use crate::model::{ClassInfo, InjectionInfo, InjectionKind, ParameterInfo};
use crate::{Position, Range};

/// Trait for injection-site detectors.
pub trait InjectionDetector: Send + Sync {
    fn detect(&self, classes: &[ClassInfo]) -> Vec<InjectionInfo>;
}

/// One injection per parameter, positioned at the parameter when known.
pub(crate) fn parameter_injections(
    kind: InjectionKind,
    owner: &ClassInfo,
    parameters: &[ParameterInfo],
    fallback_position: Position,
    fallback_range: Range,
) -> Vec<InjectionInfo> {
    parameters
        .iter()
        .map(|param| {
            InjectionInfo::new(
                kind,
                owner,
                param.param_type.clone(),
                param.name.clone(),
                param.position.unwrap_or(fallback_position),
                param.range.unwrap_or(fallback_range),
            )
            .with_qualifier(param.qualifier())
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::model::ClassInfo;

    /// Extract a single-file snippet, panicking on extraction errors.
    pub fn classes(source: &str) -> Vec<ClassInfo> {
        let result = crate::java::extract(Path::new("Test.java"), source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        result.classes
    }
}

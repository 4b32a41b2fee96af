//! Per-file analysis: extraction, bean discovery and injection detection.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::beans::discover_beans;
use crate::config::DetectorSettings;
use crate::detect::{
    BeanMethodInjectionDetector, ConstructorInjectionDetector, FieldInjectionDetector,
    InjectionDetector, LombokInjectionDetector, SetterInjectionDetector,
};
use crate::java::{ExtractionResult, JavaExtractor};
use crate::model::{BeanDefinition, ClassInfo, InjectionInfo};
use crate::syntax::{SyntaxTreeAdapter, SyntaxWarning};

/// Everything learned from one Java file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaFileParseResult {
    pub classes: Vec<ClassInfo>,
    pub bean_definitions: Vec<BeanDefinition>,
    pub injections: Vec<InjectionInfo>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SyntaxWarning>,
}

impl JavaFileParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Analyze one file with the default tree-sitter adapter.
pub fn analyze_source(file: &Path, source: &str, settings: &DetectorSettings) -> JavaFileParseResult {
    analyze_with(&JavaExtractor::new(), file, source, settings)
}

/// Read and analyze one file from disk.
pub fn analyze_file(path: &Path, settings: &DetectorSettings) -> crate::Result<JavaFileParseResult> {
    let source = std::fs::read_to_string(path)?;
    Ok(analyze_source(path, &source, settings))
}

/// Analyze one file through a specific extractor.
///
/// A file whose extraction failed contributes no beans and no injections.
pub fn analyze_with<A: SyntaxTreeAdapter>(
    extractor: &JavaExtractor<A>,
    file: &Path,
    source: &str,
    settings: &DetectorSettings,
) -> JavaFileParseResult {
    let ExtractionResult {
        classes,
        errors,
        warnings,
    } = extractor.extract(file, source);

    if !errors.is_empty() {
        return JavaFileParseResult {
            errors,
            warnings,
            ..Default::default()
        };
    }

    let field = FieldInjectionDetector::with_source(source);
    let detectors: [(bool, &dyn InjectionDetector); 5] = [
        (settings.field, &field),
        (settings.constructor, &ConstructorInjectionDetector),
        (settings.setter, &SetterInjectionDetector),
        (settings.lombok, &LombokInjectionDetector),
        (settings.bean_method, &BeanMethodInjectionDetector),
    ];
    let injections = detectors
        .iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, detector)| detector.detect(&classes))
        .collect();

    JavaFileParseResult {
        bean_definitions: discover_beans(&classes),
        classes,
        injections,
        errors,
        warnings,
    }
}

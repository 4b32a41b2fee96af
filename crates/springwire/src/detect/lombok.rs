//! Lombok constructor simulation.
//!
//! Lombok runs at compile time, so its constructors never appear in source.
//! This module works out what `@RequiredArgsConstructor` and
//! `@AllArgsConstructor` would generate and reports the parameters as
//! injection sites.

use serde::{Deserialize, Serialize};

use crate::model::{
    AnnotationInfo, AnnotationKind, ClassInfo, FieldInfo, InjectionInfo, InjectionKind,
    ParameterInfo, VirtualConstructorInfo,
};
use crate::Visibility;

use super::{parameter_injections, InjectionDetector};

/// How each field takes part in the simulated constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LombokFieldAnalysis {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub is_final: bool,
    pub is_static: bool,
    pub is_non_null: bool,
    pub in_required_args: bool,
    pub in_all_args: bool,
}

impl LombokFieldAnalysis {
    fn of(field: &FieldInfo) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            is_final: field.is_final,
            is_static: field.is_static,
            is_non_null: field.has_annotation(AnnotationKind::NonNull),
            in_required_args: is_required_arg(field),
            in_all_args: !field.is_static,
        }
    }
}

/// Outcome of simulating Lombok on one class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LombokSimulationResult {
    pub virtual_constructors: Vec<VirtualConstructorInfo>,
    pub field_analysis: Vec<LombokFieldAnalysis>,
    pub is_success: bool,
    pub errors: Vec<String>,
}

impl LombokSimulationResult {
    fn failed(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }
}

/// `final` or `@NonNull`, never `static`.
fn is_required_arg(field: &FieldInfo) -> bool {
    !field.is_static && field.is_required()
}

fn virtual_constructor<'a>(
    annotation: &AnnotationInfo,
    fields: impl Iterator<Item = &'a FieldInfo>,
) -> VirtualConstructorInfo {
    let parameters = fields
        .enumerate()
        .map(|(index, field)| {
            let mut param = ParameterInfo::new(field.name.clone(), field.field_type.clone());
            param.position = Some(field.position);
            param.range = Some(field.range);
            param.index = Some(index);
            param.annotations = field
                .annotations
                .iter()
                .filter(|a| a.kind == AnnotationKind::Qualifier)
                .cloned()
                .collect();
            param
        })
        .collect();

    VirtualConstructorInfo {
        parameters,
        range: crate::Range::at(annotation.position()),
        lombok_kind: annotation.kind,
        annotation_source: format!("@{}", annotation.name),
        visibility: Visibility::Public,
        is_virtual: true,
        position: annotation.position(),
    }
}

/// The constructor `@RequiredArgsConstructor` would generate: non-static
/// fields that are `final` or `@NonNull`, in declaration order.
pub fn detect_required_args_constructor(class: &ClassInfo) -> Option<VirtualConstructorInfo> {
    let annotation = class.annotation(AnnotationKind::RequiredArgsConstructor)?;
    Some(virtual_constructor(
        annotation,
        class.fields.iter().filter(|f| is_required_arg(f)),
    ))
}

/// The constructor `@AllArgsConstructor` would generate: every non-static field.
pub fn detect_all_args_constructor(class: &ClassInfo) -> Option<VirtualConstructorInfo> {
    let annotation = class.annotation(AnnotationKind::AllArgsConstructor)?;
    Some(virtual_constructor(
        annotation,
        class.fields.iter().filter(|f| !f.is_static),
    ))
}

/// An annotation whose name and recorded kind disagree, where either side is Lombok.
fn malformed(annotation: &AnnotationInfo) -> Option<String> {
    let by_name = AnnotationKind::from_name(&annotation.name);
    if by_name == Some(annotation.kind) {
        return None;
    }
    let involves_lombok =
        annotation.kind.is_lombok() || by_name.is_some_and(|kind| kind.is_lombok());
    involves_lombok.then(|| {
        format!(
            "Annotation @{} at {} is recorded as {:?}",
            annotation.name,
            annotation.position(),
            annotation.kind
        )
    })
}

/// Run both constructor rules on `class`.
///
/// Fails only on malformed annotation records; a class without Lombok
/// annotations succeeds with no virtual constructors.
pub fn simulate_lombok_generation(class: &ClassInfo) -> LombokSimulationResult {
    let errors: Vec<String> = class
        .annotations
        .iter()
        .chain(class.fields.iter().flat_map(|f| f.annotations.iter()))
        .filter_map(malformed)
        .collect();
    if !errors.is_empty() {
        return LombokSimulationResult::failed(errors);
    }

    let virtual_constructors = detect_required_args_constructor(class)
        .into_iter()
        .chain(detect_all_args_constructor(class))
        .collect();

    LombokSimulationResult {
        virtual_constructors,
        field_analysis: class.fields.iter().map(LombokFieldAnalysis::of).collect(),
        is_success: true,
        errors: Vec::new(),
    }
}

/// Injections from Lombok-generated constructors.
///
/// A class that declares any constructor of its own is skipped. When both
/// `@AllArgsConstructor` and `@RequiredArgsConstructor` are present the
/// all-args constructor is the one reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct LombokInjectionDetector;

impl LombokInjectionDetector {
    fn injections_for(class: &ClassInfo) -> Vec<InjectionInfo> {
        if !class.constructors.is_empty() {
            if class.annotations.iter().any(|a| a.kind.is_lombok()) {
                tracing::debug!(
                    "{} declares a constructor, ignoring Lombok constructors",
                    class.fully_qualified_name
                );
            }
            return Vec::new();
        }

        let simulation = simulate_lombok_generation(class);
        if !simulation.is_success {
            tracing::warn!(
                "Lombok simulation failed for {}: {}",
                class.fully_qualified_name,
                simulation.errors.join("; ")
            );
            return Vec::new();
        }

        let chosen = simulation
            .virtual_constructors
            .iter()
            .find(|c| c.lombok_kind == AnnotationKind::AllArgsConstructor)
            .or_else(|| simulation.virtual_constructors.first());

        chosen
            .map(|ctor| {
                parameter_injections(
                    InjectionKind::ConstructorLombok,
                    class,
                    &ctor.parameters,
                    ctor.position,
                    ctor.range,
                )
            })
            .unwrap_or_default()
    }
}

impl InjectionDetector for LombokInjectionDetector {
    fn detect(&self, classes: &[ClassInfo]) -> Vec<InjectionInfo> {
        classes.iter().flat_map(Self::injections_for).collect()
    }
}

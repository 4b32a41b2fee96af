//! Injection-target resolution.
//!
//! Follows Spring's precedence:
//! 1. Beans whose declared type or interface matches the target type
//! 2. For collection targets, beans matching the element type (never auto-resolved)
//! 3. A single non-collection candidate is the resolved bean
//! 4. Several candidates are narrowed by name: exact, case-insensitive, then
//!    first-letter case transform

use serde::{Deserialize, Serialize};

use crate::model::{BeanDefinition, InjectionInfo};
use crate::registry::BeanRegistry;

/// Outcome of resolving one injection target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeanResolutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<BeanDefinition>,
    pub candidates: Vec<BeanDefinition>,
    /// Candidates were found through a collection's element type.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collection: bool,
}

/// How an injection site is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    /// Exactly one bean is injected
    Resolved,
    /// Every candidate is injected into a collection
    Collection,
    /// Several candidates and none chosen
    Ambiguous,
    Unresolved,
}

impl BeanResolutionResult {
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// A collection target with at least one element bean.
    pub fn is_collection(&self) -> bool {
        self.collection && !self.candidates.is_empty()
    }

    /// Several candidates and none chosen.
    pub fn is_ambiguous(&self) -> bool {
        self.resolved.is_none() && !self.collection && self.candidates.len() > 1
    }

    pub fn status(&self) -> ResolutionStatus {
        if self.is_resolved() {
            ResolutionStatus::Resolved
        } else if self.is_collection() {
            ResolutionStatus::Collection
        } else if self.is_ambiguous() {
            ResolutionStatus::Ambiguous
        } else {
            ResolutionStatus::Unresolved
        }
    }
}

/// Collection wrappers whose element type Spring injects.
const COLLECTION_TYPES: &[&str] = &["List", "Set", "Collection", "Map"];

/// Element type of a collection target: `List<Foo>` -> `Foo`,
/// `Map<String, Foo>` -> `Foo`, `Foo[]` -> `Foo`.
pub fn collection_element_type(target_type: &str) -> Option<&str> {
    let target = target_type.trim();
    if let Some(element) = target.strip_suffix("[]") {
        let element = element.trim();
        return (!element.is_empty()).then_some(element);
    }

    let open = target.find('<')?;
    let wrapper = target[..open].trim();
    let wrapper = wrapper.rsplit('.').next().unwrap_or(wrapper);
    if !COLLECTION_TYPES.contains(&wrapper) {
        return None;
    }
    let args = target[open + 1..].strip_suffix('>')?;

    let element = if wrapper == "Map" {
        let comma = top_level_comma(args)?;
        &args[comma + 1..]
    } else {
        args
    };
    let element = element.trim();
    (!element.is_empty()).then_some(element)
}

/// Index of the first comma not nested inside `<...>`.
fn top_level_comma(args: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pick a candidate by name: exact, case-insensitive, then first-letter
/// lower-casing applied to either side.
fn match_by_name<'a>(candidates: &[&'a BeanDefinition], name: &str) -> Option<&'a BeanDefinition> {
    candidates
        .iter()
        .find(|b| b.name == name)
        .or_else(|| candidates.iter().find(|b| b.name.eq_ignore_ascii_case(name)))
        .or_else(|| {
            let wanted = lower_first(name);
            candidates
                .iter()
                .find(|b| lower_first(&b.name) == wanted || b.name == wanted)
        })
        .copied()
}

impl BeanRegistry {
    /// Resolve a target type, optionally disambiguated by name.
    ///
    /// Blank input is "no match", never an error.
    pub fn resolve(&self, target_type: &str, target_name: Option<&str>) -> BeanResolutionResult {
        if target_type.trim().is_empty() {
            return BeanResolutionResult::default();
        }

        let mut candidates = self.find_by_type(target_type);
        let mut is_collection = false;
        if candidates.is_empty() {
            if let Some(element) = collection_element_type(target_type) {
                candidates = self.find_by_type(element);
                is_collection = true;
            }
        }

        let name = target_name.map(str::trim).filter(|n| !n.is_empty());
        let resolved = match (candidates.as_slice(), is_collection) {
            (_, true) => None,
            ([only], false) => Some(*only),
            ([], false) => None,
            (many, false) => name.and_then(|n| match_by_name(many, n)),
        };

        tracing::debug!(
            "Resolved {} ({:?}): {} candidate(s), resolved={:?}",
            target_type,
            name,
            candidates.len(),
            resolved.map(|b| &b.name)
        );

        BeanResolutionResult {
            resolved: resolved.cloned(),
            candidates: candidates.into_iter().cloned().collect(),
            collection: is_collection,
        }
    }

    /// Resolve an injection site, using its qualifier or name as the tie-breaker.
    pub fn resolve_injection(&self, injection: &InjectionInfo) -> BeanResolutionResult {
        self.resolve(&injection.target_type, Some(injection.name_hint()))
    }
}

//! springwire: Spring dependency-injection discovery for Java sources
//!
//! This crate recovers Spring wiring without a compiler or a running application:
//! - Structural extraction of classes, fields, constructors and methods using tree-sitter
//! - Classification of Spring and Lombok annotations
//! - Injection-site detection (field, constructor, setter, Lombok, `@Bean` parameters)
//! - A bean registry that resolves injection sites with Spring's precedence rules

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod analyze;
pub mod beans;
pub mod config;
pub mod detect;
pub mod java;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod syntax;
pub mod watch;
pub mod workspace;

// Re-export main types
pub use analyze::{analyze_file, analyze_source, JavaFileParseResult};
pub use config::{Config, DetectorSettings, CONFIG_FILE};
pub use detect::{InjectionDetector, LombokSimulationResult};
pub use java::{extract, extract_file, ExtractionResult, JavaExtractor};
pub use model::{
    AnnotationInfo, AnnotationKind, BeanDefinition, BeanDefinitionKind, ClassInfo,
    ConstructorInfo, FieldInfo, InjectionInfo, InjectionKind, MethodInfo, ParameterInfo,
    VirtualConstructorInfo,
};
pub use registry::BeanRegistry;
pub use resolve::{BeanResolutionResult, ResolutionStatus};
pub use workspace::{FsSourceProvider, SourceFile, SourceProvider, Workspace, WorkspaceSummary};

/// A 1-indexed position in source code.
///
/// `(0, 0)` is used when no position could be determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The "unknown position" sentinel.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A start/end span in source code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `position`.
    pub fn at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }
}

/// Visibility of a Java member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Package => write!(f, "package"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Errors that can occur while analyzing a workspace
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

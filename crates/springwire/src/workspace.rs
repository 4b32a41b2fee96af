//! Workspace-level analysis: many files, one bean registry.
//!
//! A [`SourceProvider`] supplies file contents; the [`Workspace`] analyzes
//! them, keeps the per-file results and a [`BeanRegistry`] built from all of
//! them, and answers resolution queries across files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analyze::{analyze_source, JavaFileParseResult};
use crate::config::{Config, DetectorSettings};
use crate::model::{BeanDefinition, InjectionInfo};
use crate::registry::BeanRegistry;
use crate::resolve::ResolutionStatus;
use crate::watch::is_java_file;
use crate::Position;

/// One source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_ref: PathBuf,
    pub text: String,
}

/// Supplies the Java documents of a workspace.
pub trait SourceProvider: Send + Sync {
    fn source_files(&self) -> crate::Result<Vec<SourceFile>>;
}

/// Reads `.java` files from disk, honoring `.gitignore` and excluded directories.
#[derive(Debug, Clone)]
pub struct FsSourceProvider {
    root: PathBuf,
    exclude_dirs: Vec<String>,
    respect_gitignore: bool,
}

impl FsSourceProvider {
    pub fn new(root: &Path, config: &Config) -> Self {
        Self {
            root: root.to_path_buf(),
            exclude_dirs: config
                .excluded_dirs()
                .into_iter()
                .map(str::to_string)
                .collect(),
            respect_gitignore: config.respect_gitignore,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find all Java files under the root.
    ///
    /// - Respects .gitignore files (including nested ones) when `respect_gitignore` is true
    /// - Respects global gitignore and .git/info/exclude
    /// - Applies custom directory exclusions on top
    pub fn find_java_files(&self) -> Vec<PathBuf> {
        use ignore::WalkBuilder;

        let respect = self.respect_gitignore;
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .require_git(false)
            .ignore(respect)
            .parents(respect)
            .overrides(self.overrides());

        let mut files = Vec::new();
        for entry in builder.build() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_java_file(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(err) => {
                    tracing::warn!("Error walking directory: {}", err);
                }
            }
        }
        files.sort();
        files
    }

    /// Whether a single path would be picked up by [`find_java_files`](Self::find_java_files).
    ///
    /// Used for watcher events, which arrive one path at a time. Gitignore
    /// rules come from the root `.gitignore` only.
    pub fn is_included(&self, path: &Path) -> bool {
        if !is_java_file(path) {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };

        let overrides = self.overrides();
        let mut dir = self.root.clone();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                dir.push(component);
                let hidden = component
                    .as_os_str()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'));
                if hidden || overrides.matched(&dir, true).is_ignore() {
                    return false;
                }
            }
        }

        if self.respect_gitignore {
            let gitignore = self.gitignore();
            if gitignore
                .matched_path_or_any_parents(path, false)
                .is_ignore()
            {
                return false;
            }
        }
        true
    }

    /// Overrides for custom exclusions (these take precedence over gitignore).
    fn overrides(&self) -> ignore::overrides::Override {
        use ignore::overrides::{Override, OverrideBuilder};

        let mut override_builder = OverrideBuilder::new(&self.root);
        for dir in &self.exclude_dirs {
            // Exclude pattern: !dir/ means "do not include this directory"
            let pattern = format!("!{}/", dir);
            if let Err(e) = override_builder.add(&pattern) {
                tracing::warn!("Invalid exclude pattern '{}': {}", pattern, e);
            }
        }
        override_builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build overrides: {}", e);
            Override::empty()
        })
    }

    fn gitignore(&self) -> ignore::gitignore::Gitignore {
        use ignore::gitignore::{Gitignore, GitignoreBuilder};

        let mut builder = GitignoreBuilder::new(&self.root);
        let path = self.root.join(".gitignore");
        if path.exists() {
            if let Some(e) = builder.add(&path) {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
            }
        }
        builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build gitignore matcher: {}", e);
            Gitignore::empty()
        })
    }
}

impl SourceProvider for FsSourceProvider {
    fn source_files(&self) -> crate::Result<Vec<SourceFile>> {
        let files = self
            .find_java_files()
            .into_iter()
            .filter_map(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Some(SourceFile {
                    file_ref: path,
                    text,
                }),
                Err(e) => {
                    tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        Ok(files)
    }
}

/// Totals for a workspace, as reported by `swire scan`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub files: usize,
    pub classes: usize,
    pub beans: usize,
    pub injections: usize,
    pub resolved: usize,
    /// Collection targets with at least one element bean
    pub collections: usize,
    pub ambiguous: usize,
    pub unresolved: usize,
    pub files_with_errors: usize,
}

/// Analysis state for a set of Java files.
#[derive(Debug, Default)]
pub struct Workspace {
    settings: DetectorSettings,
    files: BTreeMap<PathBuf, JavaFileParseResult>,
    registry: BeanRegistry,
}

impl Workspace {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Discard everything and re-analyze every file from `provider`.
    ///
    /// Files are parsed in parallel; the registry is rebuilt on the calling thread.
    pub fn refresh(&mut self, provider: &dyn SourceProvider) -> crate::Result<()> {
        let sources = provider.source_files()?;
        let settings = self.settings;

        let results: Vec<(PathBuf, JavaFileParseResult)> = sources
            .into_par_iter()
            .map(|source| {
                let result = analyze_source(&source.file_ref, &source.text, &settings);
                (source.file_ref, result)
            })
            .collect();

        self.files.clear();
        self.registry.clear();
        for (file, result) in results {
            self.registry.extend(result.bean_definitions.iter().cloned());
            self.files.insert(file, result);
        }

        tracing::info!(
            "Analyzed {} files: {} beans, {} injections",
            self.files.len(),
            self.registry.len(),
            self.injections().count()
        );
        Ok(())
    }

    /// Re-analyze a single file after an edit.
    pub fn update_file(&mut self, file: &Path, text: &str) -> &JavaFileParseResult {
        self.registry.remove_file(file);
        let result = analyze_source(file, text, &self.settings);
        self.registry.extend(result.bean_definitions.iter().cloned());
        self.files.insert(file.to_path_buf(), result);
        &self.files[file]
    }

    /// Forget a deleted file.
    pub fn remove_file(&mut self, file: &Path) {
        self.registry.remove_file(file);
        self.files.remove(file);
    }

    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    pub fn file(&self, file: &Path) -> Option<&JavaFileParseResult> {
        self.files.get(file)
    }

    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &JavaFileParseResult)> {
        self.files.iter()
    }

    /// Every injection site, unresolved, in file order.
    pub fn injections(&self) -> impl Iterator<Item = &InjectionInfo> {
        self.files.values().flat_map(|r| r.injections.iter())
    }

    /// Every injection site with `resolved_bean` and `candidate_beans` filled in.
    pub fn resolved_injections(&self) -> Vec<InjectionInfo> {
        self.injections()
            .map(|injection| self.resolve_injection(injection))
            .collect()
    }

    /// A copy of `injection` with its resolution attached.
    pub fn resolve_injection(&self, injection: &InjectionInfo) -> InjectionInfo {
        let resolution = self.registry.resolve_injection(injection);
        let mut resolved = injection.clone();
        resolved.resolved_bean = resolution.resolved;
        resolved.candidate_beans = Some(resolution.candidates);
        resolved
    }

    /// Classification shared by [`Workspace::summary`] and injection listings.
    pub fn resolution_status(&self, injection: &InjectionInfo) -> ResolutionStatus {
        self.registry.resolve_injection(injection).status()
    }

    /// Where to navigate from an injection site: the resolved bean, or every
    /// candidate when resolution was ambiguous.
    pub fn navigation_targets(&self, injection: &InjectionInfo) -> Vec<(PathBuf, Position)> {
        let resolution = self.registry.resolve_injection(injection);
        let beans: Vec<BeanDefinition> = match resolution.resolved {
            Some(bean) => vec![bean],
            None => resolution.candidates,
        };
        beans
            .into_iter()
            .map(|bean| (bean.file_ref, bean.position))
            .collect()
    }

    pub fn summary(&self) -> WorkspaceSummary {
        let mut summary = WorkspaceSummary {
            files: self.files.len(),
            classes: self.files.values().map(|r| r.classes.len()).sum(),
            beans: self.registry.len(),
            files_with_errors: self.files.values().filter(|r| r.has_errors()).count(),
            ..Default::default()
        };
        for injection in self.injections() {
            summary.injections += 1;
            match self.resolution_status(injection) {
                ResolutionStatus::Resolved => summary.resolved += 1,
                ResolutionStatus::Collection => summary.collections += 1,
                ResolutionStatus::Ambiguous => summary.ambiguous += 1,
                ResolutionStatus::Unresolved => summary.unresolved += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InjectionKind;
    use tempfile::TempDir;

    struct MemoryProvider(Vec<SourceFile>);

    impl SourceProvider for MemoryProvider {
        fn source_files(&self) -> crate::Result<Vec<SourceFile>> {
            Ok(self.0.clone())
        }
    }

    fn source(name: &str, text: &str) -> SourceFile {
        SourceFile {
            file_ref: PathBuf::from(name),
            text: text.to_string(),
        }
    }

    const ORDER_SERVICE: &str = r#"
package com.example.order;

@Service
public class OrderService {
    private final UserRepository userRepository;
    private final EmailService emailService;

    public OrderService(UserRepository userRepository, EmailService emailService) {
        this.userRepository = userRepository;
        this.emailService = emailService;
    }

    @Autowired
    private UnknownType unknownType;
}
"#;

    const USER_REPOSITORY: &str = r#"
package com.example.user;

@Repository
public class JpaUserRepository implements UserRepository {}
"#;

    const EMAIL_SERVICE: &str = r#"
package com.example.mail;

@Service
public class EmailService {}
"#;

    fn workspace() -> Workspace {
        let provider = MemoryProvider(vec![
            source("OrderService.java", ORDER_SERVICE),
            source("JpaUserRepository.java", USER_REPOSITORY),
            source("EmailService.java", EMAIL_SERVICE),
        ]);
        let mut workspace = Workspace::new(DetectorSettings::default());
        workspace.refresh(&provider).unwrap();
        workspace
    }

    #[test]
    fn test_order_service_constructor_injections_resolve() {
        let workspace = workspace();
        let injections = workspace.resolved_injections();
        let ctor: Vec<_> = injections
            .iter()
            .filter(|i| i.injection_kind == InjectionKind::Constructor)
            .collect();
        assert_eq!(ctor.len(), 2);
        assert_eq!(
            ctor[0].resolved_bean.as_ref().unwrap().name,
            "jpaUserRepository"
        );
        assert_eq!(ctor[1].resolved_bean.as_ref().unwrap().name, "emailService");
    }

    #[test]
    fn test_unknown_type_is_unresolved() {
        let workspace = workspace();
        let unknown = workspace
            .resolved_injections()
            .into_iter()
            .find(|i| i.target_name == "unknownType")
            .unwrap();
        assert!(unknown.resolved_bean.is_none());
        assert_eq!(unknown.candidate_beans, Some(Vec::new()));
    }

    #[test]
    fn test_summary() {
        let summary = workspace().summary();
        assert_eq!(summary.files, 3);
        assert_eq!(summary.beans, 3);
        assert_eq!(summary.injections, 3);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.ambiguous, 0);
        assert_eq!(summary.collections, 0);
    }

    #[test]
    fn test_single_bean_collection_is_satisfied() {
        let consumer = r#"
package com.example;

@Service
public class Consumer {
    @Autowired
    private List<Foo> foos;
}
"#;
        let provider = MemoryProvider(vec![
            source("Consumer.java", consumer),
            source("FooImpl.java", "package com.example;\n\n@Component\nclass FooImpl implements Foo {}\n"),
        ]);
        let mut workspace = Workspace::new(DetectorSettings::default());
        workspace.refresh(&provider).unwrap();

        let injection = workspace.injections().next().unwrap().clone();
        assert_eq!(
            workspace.resolution_status(&injection),
            ResolutionStatus::Collection
        );
        let summary = workspace.summary();
        assert_eq!(summary.collections, 1);
        assert_eq!(summary.unresolved, 0);
        assert_eq!(summary.ambiguous, 0);
        assert_eq!(summary.resolved, 0);
    }

    #[test]
    fn test_navigation_targets() {
        let workspace = workspace();
        let injection = workspace
            .injections()
            .find(|i| i.target_type == "UserRepository")
            .unwrap()
            .clone();
        let targets = workspace.navigation_targets(&injection);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0, PathBuf::from("JpaUserRepository.java"));
        assert_eq!(targets[0].1, Position::new(5, 14));
    }

    #[test]
    fn test_incremental_updates() {
        let mut workspace = workspace();
        let second = r#"
package com.example.user;

@Repository("cachedUsers")
public class CachedUserRepository implements UserRepository {}
"#;
        workspace.update_file(Path::new("CachedUserRepository.java"), second);
        assert_eq!(workspace.registry().len(), 4);
        assert_eq!(workspace.summary().ambiguous, 1);

        workspace.remove_file(Path::new("JpaUserRepository.java"));
        let injection = workspace
            .resolved_injections()
            .into_iter()
            .find(|i| i.target_type == "UserRepository")
            .unwrap();
        assert_eq!(injection.resolved_bean.unwrap().name, "cachedUsers");

        // Editing a file away drops its beans.
        workspace.update_file(Path::new("EmailService.java"), "class EmailService {}");
        assert!(workspace.registry().find_by_name("emailService").is_none());
    }

    #[test]
    fn test_fs_provider_finds_java_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src/main/java");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(temp.path().join("build/generated")).unwrap();
        std::fs::write(src.join("A.java"), "@Service class A {}").unwrap();
        std::fs::write(src.join("notes.md"), "# notes").unwrap();
        std::fs::write(temp.path().join("build/generated/B.java"), "class B {}").unwrap();

        let provider = FsSourceProvider::new(temp.path(), &Config::default());
        let files = provider.source_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].file_ref.ends_with("A.java"));

        let mut workspace = Workspace::new(DetectorSettings::default());
        workspace.refresh(&provider).unwrap();
        assert_eq!(workspace.registry().len(), 1);
    }

    #[test]
    fn test_fs_provider_is_included_matches_walk() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        std::fs::write(root.join(".gitignore"), "generated-sources/\n").unwrap();

        let config = Config {
            exclude_dirs: vec!["legacy".to_string()],
            ..Config::default()
        };
        let provider = FsSourceProvider::new(&root, &config);

        assert!(provider.is_included(&root.join("src/main/java/A.java")));
        assert!(!provider.is_included(&root.join("src/main/java/notes.md")));
        assert!(!provider.is_included(&root.join("build/generated/B.java")));
        assert!(!provider.is_included(&root.join("target/classes/C.java")));
        assert!(!provider.is_included(&root.join("legacy/D.java")));
        assert!(!provider.is_included(&root.join(".idea/E.java")));
        assert!(!provider.is_included(&root.join("app/generated-sources/F.java")));
        assert!(!provider.is_included(Path::new("/elsewhere/G.java")));

        let unfiltered = FsSourceProvider::new(
            &root,
            &Config {
                respect_gitignore: false,
                ..Config::default()
            },
        );
        assert!(unfiltered.is_included(&root.join("app/generated-sources/F.java")));
    }
}

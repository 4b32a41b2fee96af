//! swire: Spring dependency-injection navigation for Java sources.
//!
//! This CLI provides access to springwire functionality for:
//! - Summarizing the beans and injection sites of a project
//! - Listing bean definitions and injection sites with their resolution
//! - Resolving a type (and optional name) against the bean registry
//! - Inspecting one file's analysis or Lombok constructor simulation
//! - Watching for file changes

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use springwire::{
    analyze_file,
    detect::lombok::simulate_lombok_generation,
    extract_file,
    watch::{DebouncedFileWatcher, WatchEvent},
    BeanDefinition, Config, FsSourceProvider, InjectionInfo, ResolutionStatus, Workspace,
    WorkspaceSummary, CONFIG_FILE,
};

/// Exit codes for the CLI
///
/// - 0: Success
/// - 1: Not found (valid query, no results)
/// - 2: Error (invalid input, missing file, etc.)
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const NOT_FOUND: u8 = 1;
    pub const ERROR: u8 = 2;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Text,
}

/// Navigate Spring dependency injection in Java sources
#[derive(Parser)]
#[command(name = "swire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project and summarize its beans and injection sites
    Scan {
        /// Root directory to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// List bean definitions
    Beans {
        /// Root directory to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// List injection sites with their resolution
    Injections {
        /// Root directory to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Only show injection sites declared in this file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only show ambiguous and unresolved injection sites
        #[arg(long)]
        unresolved: bool,
    },

    /// Resolve a type against the bean registry
    Resolve {
        /// Declared type (e.g. "UserRepository", "Step<AddUgcContext>", "List<Handler>")
        target_type: String,

        /// Field, parameter or qualifier name used to pick between candidates
        #[arg(short, long)]
        name: Option<String>,

        /// Root directory to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Show the full analysis of one Java file
    Analyze {
        /// Java source file
        file: PathBuf,
    },

    /// Show the constructors Lombok would generate for each class in a file
    Lombok {
        /// Java source file
        file: PathBuf,
    },

    /// Watch for file changes and keep the analysis current
    Watch {
        /// Root directory to watch (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli.command, format, cli.quiet) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            if format == OutputFormat::Json {
                let error_json = serde_json::json!({
                    "error": "CommandFailed",
                    "message": e.to_string(),
                });
                eprintln!("{}", error_json);
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run(command: Commands, format: OutputFormat, quiet: bool) -> Result<u8> {
    match command {
        Commands::Scan { root } => cmd_scan(&root, format, quiet),
        Commands::Beans { root } => cmd_beans(&root, format, quiet),
        Commands::Injections {
            root,
            file,
            unresolved,
        } => cmd_injections(&root, file.as_deref(), unresolved, format, quiet),
        Commands::Resolve {
            target_type,
            name,
            root,
        } => cmd_resolve(&root, &target_type, name.as_deref(), format, quiet),
        Commands::Analyze { file } => cmd_analyze(&file, format, quiet),
        Commands::Lombok { file } => cmd_lombok(&file, format, quiet),
        Commands::Watch { root } => cmd_watch(&root, format, quiet),
    }
}

/// Canonicalize `root` and analyze every Java file under it.
fn load_workspace(root: &Path) -> Result<(PathBuf, Workspace)> {
    let (provider, workspace) = open_workspace(root)?;
    Ok((provider.root().to_path_buf(), workspace))
}

/// Like [`load_workspace`], but keeps the provider for later inclusion checks.
fn open_workspace(root: &Path) -> Result<(FsSourceProvider, Workspace)> {
    let root = root
        .canonicalize()
        .context("Failed to resolve root directory")?;

    let config = Config::load(&root);
    let provider = FsSourceProvider::new(&root, &config);
    let mut workspace = Workspace::new(config.detectors);
    workspace
        .refresh(&provider)
        .context("Failed to analyze workspace")?;

    Ok((provider, workspace))
}

/// Nearest ancestor of `file` holding a config file, else its parent directory.
fn config_root(file: &Path) -> &Path {
    let parent = file.parent().unwrap_or(Path::new("."));
    parent
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .unwrap_or(parent)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn location(file: &Path, root: &Path) -> String {
    file.strip_prefix(root).unwrap_or(file).display().to_string()
}

/// Summarize a project
fn cmd_scan(root: &Path, format: OutputFormat, quiet: bool) -> Result<u8> {
    let (root, workspace) = load_workspace(root)?;
    let summary = workspace.summary();

    if format == OutputFormat::Json {
        let mut output = serde_json::to_value(&summary)?;
        output["root"] = serde_json::Value::String(root.display().to_string());
        print_json(&output)?;
    } else if !quiet {
        print_summary(&root, &summary);
        for (file, result) in workspace.files() {
            for error in &result.errors {
                eprintln!("{}: {}", location(file, &root), error);
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn print_summary(root: &Path, summary: &WorkspaceSummary) {
    println!("Root:        {}", root.display());
    println!("Files:       {}", summary.files);
    println!("Classes:     {}", summary.classes);
    println!("Beans:       {}", summary.beans);
    println!("Injections:  {}", summary.injections);
    println!("  resolved:  {}", summary.resolved);
    println!("  collections: {}", summary.collections);
    println!("  ambiguous: {}", summary.ambiguous);
    println!("  unresolved: {}", summary.unresolved);
    if summary.files_with_errors > 0 {
        println!("Files with errors: {}", summary.files_with_errors);
    }
}

/// List bean definitions
fn cmd_beans(root: &Path, format: OutputFormat, quiet: bool) -> Result<u8> {
    let (root, workspace) = load_workspace(root)?;
    let beans: Vec<&BeanDefinition> = workspace.registry().iter().collect();

    if format == OutputFormat::Json {
        print_json(&beans)?;
    } else if !quiet {
        for bean in beans {
            println!(
                "{:<30} {:<30} {}:{}:{}",
                bean.name,
                bean.bean_type,
                location(&bean.file_ref, &root),
                bean.position.line,
                bean.position.column
            );
        }
    }

    Ok(exit_codes::SUCCESS)
}

/// List injection sites with their resolution
fn cmd_injections(
    root: &Path,
    file: Option<&Path>,
    unresolved: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<u8> {
    let (root, workspace) = load_workspace(root)?;
    let file = file
        .map(|f| f.canonicalize().context("Failed to resolve file path"))
        .transpose()?;

    let injections: Vec<InjectionOutput> = workspace
        .injections()
        .filter(|i| file.as_ref().map_or(true, |f| &i.file_ref == f))
        .map(|i| InjectionOutput {
            status: workspace.resolution_status(i),
            injection: workspace.resolve_injection(i),
        })
        .filter(|output| {
            !unresolved
                || matches!(
                    output.status,
                    ResolutionStatus::Ambiguous | ResolutionStatus::Unresolved
                )
        })
        .collect();

    if format == OutputFormat::Json {
        print_json(&injections)?;
    } else if !quiet {
        for output in &injections {
            let injection = &output.injection;
            println!(
                "{}:{}:{} {} {} {} -> {}",
                location(&injection.file_ref, &root),
                injection.position.line,
                injection.position.column,
                injection.injection_kind,
                injection.target_type,
                injection.target_name,
                describe_resolution(injection, output.status)
            );
        }
    }

    Ok(exit_codes::SUCCESS)
}

#[derive(Serialize)]
struct InjectionOutput {
    #[serde(flatten)]
    injection: InjectionInfo,
    status: ResolutionStatus,
}

fn describe_resolution(injection: &InjectionInfo, status: ResolutionStatus) -> String {
    let candidate_names = || {
        let names: Vec<&str> = injection
            .candidate_beans
            .iter()
            .flatten()
            .map(|b| b.name.as_str())
            .collect();
        names.join(", ")
    };
    match (status, &injection.resolved_bean) {
        (ResolutionStatus::Resolved, Some(bean)) => bean.name.clone(),
        (ResolutionStatus::Collection, _) => format!("collection ({})", candidate_names()),
        (ResolutionStatus::Ambiguous, _) => format!("ambiguous ({})", candidate_names()),
        _ => "unresolved".to_string(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveOutput<'a> {
    target_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_name: Option<&'a str>,
    resolved: Option<BeanDefinition>,
    candidates: Vec<BeanDefinition>,
}

/// Resolve a type against the registry
fn cmd_resolve(
    root: &Path,
    target_type: &str,
    name: Option<&str>,
    format: OutputFormat,
    quiet: bool,
) -> Result<u8> {
    let (root, workspace) = load_workspace(root)?;
    let resolution = workspace.registry().resolve(target_type, name);

    if resolution.candidates.is_empty() {
        if format == OutputFormat::Json {
            print_json(&serde_json::json!({
                "error": "No matching bean",
                "targetType": target_type,
            }))?;
        } else if !quiet {
            eprintln!("No bean matches: {}", target_type);
        }
        return Ok(exit_codes::NOT_FOUND);
    }

    if format == OutputFormat::Json {
        print_json(&ResolveOutput {
            target_type,
            target_name: name,
            resolved: resolution.resolved,
            candidates: resolution.candidates,
        })?;
    } else if !quiet {
        match &resolution.resolved {
            Some(bean) => println!(
                "{} {}:{}:{}",
                bean.name,
                location(&bean.file_ref, &root),
                bean.position.line,
                bean.position.column
            ),
            None => println!("Ambiguous: {} candidates", resolution.candidates.len()),
        }
        if resolution.resolved.is_none() || format == OutputFormat::Pretty {
            for bean in &resolution.candidates {
                println!(
                    "  {:<30} {}:{}:{}",
                    bean.name,
                    location(&bean.file_ref, &root),
                    bean.position.line,
                    bean.position.column
                );
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

/// Analyze a single file
fn cmd_analyze(file: &Path, format: OutputFormat, quiet: bool) -> Result<u8> {
    let file = file.canonicalize().context("Failed to resolve file path")?;
    let config = Config::load(config_root(&file));
    let result = analyze_file(&file, &config.detectors)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    if format == OutputFormat::Json {
        print_json(&result)?;
    } else if !quiet {
        for class in &result.classes {
            println!(
                "class {} {}:{}",
                class.fully_qualified_name, class.position.line, class.position.column
            );
        }
        for bean in &result.bean_definitions {
            println!("bean  {:<30} {}", bean.name, bean.bean_type);
        }
        for injection in &result.injections {
            println!(
                "{}:{} {} {} {}",
                injection.position.line,
                injection.position.column,
                injection.injection_kind,
                injection.target_type,
                injection.target_name
            );
        }
        for warning in &result.warnings {
            eprintln!("warning: {}", warning);
        }
        for error in &result.errors {
            eprintln!("error: {}", error);
        }
    }

    if result.has_errors() {
        return Ok(exit_codes::ERROR);
    }
    Ok(exit_codes::SUCCESS)
}

/// Simulate Lombok constructor generation for each class in a file
fn cmd_lombok(file: &Path, format: OutputFormat, quiet: bool) -> Result<u8> {
    let file = file.canonicalize().context("Failed to resolve file path")?;
    let classes =
        extract_file(&file).with_context(|| format!("Failed to parse {}", file.display()))?;

    let simulations: Vec<_> = classes
        .iter()
        .map(|class| (class, simulate_lombok_generation(class)))
        .collect();

    if format == OutputFormat::Json {
        let output: Vec<_> = simulations
            .iter()
            .map(|(class, simulation)| {
                serde_json::json!({
                    "class": class.fully_qualified_name,
                    "simulation": simulation,
                })
            })
            .collect();
        print_json(&output)?;
    } else if !quiet {
        for (class, simulation) in &simulations {
            println!("{}", class.fully_qualified_name);
            for ctor in &simulation.virtual_constructors {
                let params: Vec<String> = ctor
                    .parameters
                    .iter()
                    .map(|p| format!("{} {}", p.param_type, p.name))
                    .collect();
                println!("  {} -> {}({})", ctor.annotation_source, class.name, params.join(", "));
            }
            for error in &simulation.errors {
                println!("  error: {}", error);
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

/// Watch for file changes
fn cmd_watch(root: &Path, format: OutputFormat, quiet: bool) -> Result<u8> {
    if !quiet {
        eprintln!("Analyzing workspace...");
    }
    let (provider, mut workspace) = open_workspace(root)?;
    let root = provider.root().to_path_buf();
    if format == OutputFormat::Json {
        let mut output = serde_json::to_value(workspace.summary())?;
        output["event"] = serde_json::Value::from("ready");
        println!("{}", output);
    } else if !quiet {
        print_summary(&root, &workspace.summary());
    }

    let mut watcher =
        DebouncedFileWatcher::with_defaults(&root).context("Failed to create file watcher")?;
    watcher.start().context("Failed to start watching")?;

    if !quiet {
        eprintln!("Watching for changes... (Ctrl+C to stop)");
    }

    loop {
        for event in watcher.wait_timeout(Duration::from_secs(1)) {
            match event {
                WatchEvent::Created(path) | WatchEvent::Modified(path) => {
                    if provider.is_included(&path) {
                        update_file(&mut workspace, &path, &root, format, quiet);
                    }
                }
                WatchEvent::Deleted(path) => {
                    if workspace.file(&path).is_some() {
                        workspace.remove_file(&path);
                        report(format, quiet, &WatchReport::deleted(&path, &root));
                    }
                }
                WatchEvent::Renamed(old, new) => {
                    if workspace.file(&old).is_some() {
                        workspace.remove_file(&old);
                        report(format, quiet, &WatchReport::deleted(&old, &root));
                    }
                    if provider.is_included(&new) {
                        update_file(&mut workspace, &new, &root, format, quiet);
                    }
                }
            }
        }
    }
}

fn update_file(
    workspace: &mut Workspace,
    path: &Path,
    root: &Path,
    format: OutputFormat,
    quiet: bool,
) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return;
        }
    };
    let result = workspace.update_file(path, &text);
    let update = WatchReport {
        event: "updated",
        file: location(path, root),
        beans: Some(result.bean_definitions.len()),
        injections: Some(result.injections.len()),
    };
    report(format, quiet, &update);
}

/// One line of watch output: a JSON object per line in JSON mode, text otherwise.
#[derive(Serialize)]
struct WatchReport {
    event: &'static str,
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    beans: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    injections: Option<usize>,
}

impl WatchReport {
    fn deleted(path: &Path, root: &Path) -> Self {
        Self {
            event: "deleted",
            file: location(path, root),
            beans: None,
            injections: None,
        }
    }

    fn render(&self, format: OutputFormat) -> String {
        if format == OutputFormat::Json {
            return serde_json::to_string(self).unwrap_or_default();
        }
        match (self.beans, self.injections) {
            (Some(beans), Some(injections)) => format!(
                "Updated: {} ({} beans, {} injections)",
                self.file, beans, injections
            ),
            _ => format!("Deleted: {}", self.file),
        }
    }
}

fn report(format: OutputFormat, quiet: bool, line: &WatchReport) {
    if format == OutputFormat::Json || !quiet {
        println!("{}", line.render(format));
    }
}

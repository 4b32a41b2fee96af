#![allow(deprecated)] // cargo_bin is deprecated but still works

use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

type TestResult<T = ()> = std::result::Result<T, Box<dyn Error>>;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/spring")
}

fn fixture_file(name: &str) -> PathBuf {
    fixture_root()
        .join("src/main/java/com/example/shop")
        .join(name)
}

fn swire() -> TestResult<Command> {
    Ok(Command::cargo_bin("swire")?)
}

fn json_output(args: &[&str]) -> TestResult<serde_json::Value> {
    let output = swire()?.args(args).output()?;
    assert!(output.status.success(), "swire {:?} failed", args);
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn scan_summarizes_fixture_project() -> TestResult {
    let root = fixture_root();
    let summary = json_output(&["scan", "--root", root.to_str().unwrap()])?;

    assert_eq!(summary["files"], 7);
    assert_eq!(summary["classes"], 6);
    assert_eq!(summary["beans"], 9);
    assert_eq!(summary["injections"], 7);
    assert_eq!(summary["resolved"], 5);
    assert_eq!(summary["collections"], 1);
    assert_eq!(summary["ambiguous"], 0);
    assert_eq!(summary["unresolved"], 1);
    assert_eq!(summary["filesWithErrors"], 0);
    Ok(())
}

#[test]
fn scan_text_format() -> TestResult {
    swire()?
        .args(["scan", "--format", "text", "--root"])
        .arg(fixture_root())
        .assert()
        .success()
        .stdout(contains("Beans:       9"))
        .stdout(contains("Injections:  7"));
    Ok(())
}

#[test]
fn beans_lists_class_and_method_beans() -> TestResult {
    swire()?
        .args(["beans", "--format", "text", "--root"])
        .arg(fixture_root())
        .assert()
        .success()
        .stdout(contains("jpaUserRepository"))
        .stdout(contains("stepA"))
        .stdout(contains("Step<AddUgcContext>"))
        .stdout(contains("stepRunner"));
    Ok(())
}

#[test]
fn injections_resolve_through_interfaces_and_qualifiers() -> TestResult {
    let root = fixture_root();
    let injections = json_output(&["injections", "--root", root.to_str().unwrap()])?;
    let injections = injections.as_array().ok_or("expected an array")?;
    assert_eq!(injections.len(), 7);

    let find = |name: &str| {
        injections
            .iter()
            .find(|i| i["targetName"] == name)
            .cloned()
            .unwrap_or_default()
    };

    let repo = find("userRepository");
    assert_eq!(repo["injectionKind"], "CONSTRUCTOR");
    assert_eq!(repo["resolvedBean"]["name"], "jpaUserRepository");

    let step = find("step");
    assert_eq!(step["injectionKind"], "BEAN_METHOD");
    assert_eq!(step["qualifier"], "stepB");
    assert_eq!(step["resolvedBean"]["name"], "stepB");

    let lombok = injections
        .iter()
        .find(|i| i["injectionKind"] == "CONSTRUCTOR_LOMBOK")
        .ok_or("missing lombok injection")?;
    assert_eq!(lombok["resolvedBean"]["name"], "emailService");
    Ok(())
}

#[test]
fn injections_unresolved_filter() -> TestResult {
    let root = fixture_root();
    let injections = json_output(&[
        "injections",
        "--unresolved",
        "--root",
        root.to_str().unwrap(),
    ])?;
    let mut names: Vec<_> = injections
        .as_array()
        .ok_or("expected an array")?
        .iter()
        .map(|i| i["targetName"].as_str().unwrap_or_default().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["unknownType"]);
    Ok(())
}

#[test]
fn collection_injection_is_not_reported_ambiguous() -> TestResult {
    let root = fixture_root();
    let injections = json_output(&["injections", "--root", root.to_str().unwrap()])?;
    let all_steps = injections
        .as_array()
        .ok_or("expected an array")?
        .iter()
        .find(|i| i["targetName"] == "allSteps")
        .cloned()
        .ok_or("missing allSteps injection")?;
    assert_eq!(all_steps["status"], "COLLECTION");

    swire()?
        .args(["injections", "--format", "text", "--root"])
        .arg(fixture_root())
        .assert()
        .success()
        .stdout(contains("allSteps -> collection ("))
        .stdout(contains("unknownType -> unresolved"));
    Ok(())
}

#[test]
fn injections_file_filter() -> TestResult {
    let root = fixture_root();
    let file = fixture_file("OrderService.java");
    let injections = json_output(&[
        "injections",
        "--root",
        root.to_str().unwrap(),
        "--file",
        file.to_str().unwrap(),
    ])?;
    let kinds: Vec<_> = injections
        .as_array()
        .ok_or("expected an array")?
        .iter()
        .map(|i| i["injectionKind"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(kinds, vec!["FIELD", "CONSTRUCTOR", "CONSTRUCTOR"]);
    Ok(())
}

#[test]
fn resolve_interface_to_single_implementation() -> TestResult {
    let root = fixture_root();
    let result = json_output(&["resolve", "UserRepository", "--root", root.to_str().unwrap()])?;
    assert_eq!(result["resolved"]["name"], "jpaUserRepository");
    assert_eq!(
        result["resolved"]["implementationClassFqn"],
        "com.example.shop.repo.JpaUserRepository"
    );
    Ok(())
}

#[test]
fn resolve_generic_type_by_name() -> TestResult {
    let root = fixture_root();
    let result = json_output(&[
        "resolve",
        "Step<AddUgcContext>",
        "--name",
        "stepB",
        "--root",
        root.to_str().unwrap(),
    ])?;
    assert_eq!(result["resolved"]["name"], "stepB");
    assert_eq!(result["candidates"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn resolve_ambiguous_lists_candidates() -> TestResult {
    swire()?
        .args(["resolve", "Step<AddUgcContext>", "--format", "text", "--root"])
        .arg(fixture_root())
        .assert()
        .success()
        .stdout(contains("Ambiguous: 2 candidates"))
        .stdout(contains("stepA"))
        .stdout(contains("stepB"));
    Ok(())
}

#[test]
fn resolve_unknown_type_exits_not_found() -> TestResult {
    swire()?
        .args(["resolve", "UnknownType", "--root"])
        .arg(fixture_root())
        .assert()
        .code(1)
        .stdout(contains("No matching bean"));
    Ok(())
}

#[test]
fn analyze_single_file() -> TestResult {
    let file = fixture_file("CheckoutService.java");
    let result = json_output(&["analyze", file.to_str().unwrap()])?;

    assert_eq!(result["classes"][0]["name"], "CheckoutService");
    assert_eq!(result["beanDefinitions"][0]["name"], "checkoutService");
    let injections = result["injections"].as_array().ok_or("expected an array")?;
    assert_eq!(injections.len(), 1);
    assert_eq!(injections[0]["injectionKind"], "CONSTRUCTOR_LOMBOK");
    assert_eq!(injections[0]["targetType"], "EmailService");
    Ok(())
}

#[test]
fn lombok_shows_virtual_constructor() -> TestResult {
    swire()?
        .args(["lombok", "--format", "text"])
        .arg(fixture_file("CheckoutService.java"))
        .assert()
        .success()
        .stdout(contains("com.example.shop.CheckoutService"))
        .stdout(contains(
            "@RequiredArgsConstructor -> CheckoutService(EmailService emailService)",
        ));
    Ok(())
}

#[test]
fn missing_root_is_an_error() -> TestResult {
    swire()?
        .args(["scan", "--root", "/definitely/not/here"])
        .assert()
        .code(2)
        .stderr(contains("CommandFailed"));
    Ok(())
}

#[test]
fn missing_file_text_error() -> TestResult {
    swire()?
        .args(["analyze", "Missing.java", "--format", "text"])
        .assert()
        .code(2)
        .stderr(contains("Error: Failed to resolve file path"));
    Ok(())
}

#[test]
fn config_file_disables_detectors() -> TestResult {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join(".springwire.toml"),
        "[detectors]\nfield = false\n",
    )?;
    fs::write(
        temp.path().join("Greeter.java"),
        r#"package demo;

@Component
public class Greeter {
    @Autowired
    private Clock clock;

    @Autowired
    public void setFormatter(Formatter formatter) {}
}
"#,
    )?;

    let injections = json_output(&["injections", "--root", temp.path().to_str().unwrap()])?;
    let injections = injections.as_array().ok_or("expected an array")?;
    assert_eq!(injections.len(), 1);
    assert_eq!(injections[0]["injectionKind"], "SETTER");
    Ok(())
}

#[test]
fn analyze_uses_config_from_project_root() -> TestResult {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join(".springwire.toml"),
        "[detectors]\nfield = false\n",
    )?;
    let package = temp.path().join("src/main/java/demo");
    fs::create_dir_all(&package)?;
    let file = package.join("Greeter.java");
    fs::write(
        &file,
        r#"package demo;

@Component
public class Greeter {
    @Autowired
    private Clock clock;

    @Autowired
    public void setFormatter(Formatter formatter) {}
}
"#,
    )?;

    let result = json_output(&["analyze", file.to_str().unwrap()])?;
    let injections = result["injections"].as_array().ok_or("expected an array")?;
    assert_eq!(injections.len(), 1);
    assert_eq!(injections[0]["injectionKind"], "SETTER");
    Ok(())
}

#[test]
fn excluded_directories_are_skipped() -> TestResult {
    let temp = TempDir::new()?;
    let source = "package demo;\n\n@Service\npublic class Greeter {}\n";
    fs::write(temp.path().join("Greeter.java"), source)?;
    fs::create_dir_all(temp.path().join("target/generated"))?;
    fs::write(
        temp.path().join("target/generated/Copy.java"),
        source.replace("Greeter", "Copy"),
    )?;

    let summary = json_output(&["scan", "--root", temp.path().to_str().unwrap()])?;
    assert_eq!(summary["files"], 1);
    assert_eq!(summary["beans"], 1);
    Ok(())
}

use std::path::Path;
use std::process::{Command, Output};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

/// Run archgraph in `dir` so config discovery never picks up a stray file.
fn archgraph_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_archgraph"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run archgraph")
}

fn parse_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_analyze_json_with_layered_preset() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(
        dir.path(),
        &[
            "analyze",
            &fixture("layered-ts.json"),
            "--config",
            &fixture("layered.archgraph.toml"),
            "--format",
            "json",
        ],
    );
    assert!(
        output.status.success(),
        "analyze failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = parse_json(&output);
    assert_eq!(report["health_score"]["total"], 90);
    assert_eq!(report["health_score"]["grade"], "A");
    assert_eq!(report["summary"]["total_violations"], 3);
    assert_eq!(report["summary"]["circular_dependencies"], 1);

    let violations = report["violations"].as_array().unwrap();
    assert_eq!(violations[0]["file"], "src/controllers/user.controller.ts");
    assert_eq!(violations[0]["line"], 2);
    assert_eq!(violations[0]["category"], "blocked");
    assert_eq!(violations[0]["rule"]["from"], "controller");
    assert_eq!(violations[0]["rule"]["to"], "repository");
    assert_eq!(violations[0]["import"], "../repositories/user.repository");

    assert_eq!(violations[1]["file"], "src/models/role.ts");
    assert_eq!(violations[1]["category"], "circular");
    assert_eq!(violations[1]["line"], 1);
    assert_eq!(
        violations[1]["cycle"],
        serde_json::json!(["src/models/role.ts", "src/models/user.ts"])
    );

    assert_eq!(violations[2]["category"], "complexity");
    assert_eq!(violations[2]["function"], "register");
    assert_eq!(violations[2]["length"], 230);
}

#[test]
fn test_analyze_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let facts = fixture("layered-ts.json");
    let config = fixture("layered.archgraph.toml");
    let args: [&str; 7] = [
        "analyze", &facts, "--config", &config, "--format", "json", "--compact",
    ];
    let first = archgraph_in(dir.path(), &args);
    let second = archgraph_in(dir.path(), &args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(String::from_utf8_lossy(&first.stdout).trim().lines().count(), 1);
}

#[test]
fn test_check_fails_on_blocked_violation() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(
        dir.path(),
        &[
            "check",
            &fixture("layered-ts.json"),
            "--config",
            &fixture("layered.archgraph.toml"),
        ],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(1),
        "expected exit code 1 for blocked violations: {stdout}"
    );
    assert!(stdout.contains("CHECK FAILED"), "should say CHECK FAILED: {stdout}");
}

#[test]
fn test_check_json_wrapper() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(
        dir.path(),
        &[
            "check",
            &fixture("layered-ts.json"),
            "--config",
            &fixture("layered.archgraph.toml"),
            "--format",
            "json",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    let parsed = parse_json(&output);
    assert_eq!(parsed["check"]["passed"], false);
    assert_eq!(parsed["check"]["blocked_count"], 1);
    assert!(parsed.get("health_score").is_some());
}

#[test]
fn test_check_passes_without_rules() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(dir.path(), &["check", &fixture("layered-ts.json")]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "check should pass: {stdout}");
    assert!(stdout.contains("CHECK PASSED"), "{stdout}");
    // Cycle and long function still reported
    assert!(stdout.contains("95/100 (A)"), "{stdout}");
}

#[test]
fn test_config_discovered_from_current_directory() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::copy(
        fixture("layered.archgraph.toml"),
        dir.path().join(".archgraph.toml"),
    )
    .unwrap();
    let output = archgraph_in(
        dir.path(),
        &["analyze", &fixture("layered-ts.json"), "--format", "json"],
    );
    assert!(output.status.success());
    let report = parse_json(&output);
    assert_eq!(report["summary"]["total_violations"], 3);
}

#[test]
fn test_clean_python_project_markdown() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(
        dir.path(),
        &["analyze", &fixture("clean-python.json"), "--format", "markdown"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("| **Score** | **100/100** |"), "{stdout}");
    assert!(stdout.contains("No violations found."), "{stdout}");
}

#[test]
fn test_empty_fact_set() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let facts = dir.path().join("facts.json");
    std::fs::write(&facts, r#"{"files":[]}"#).unwrap();
    let output = archgraph_in(
        dir.path(),
        &["analyze", facts.to_str().unwrap(), "--format", "json", "--compact"],
    );
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"health_score":{"total":100,"grade":"A"},"violations":[],"summary":{"total_violations":0,"circular_dependencies":0}}"#
    );
}

#[test]
fn test_repeated_file_entries_are_merged() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let facts = dir.path().join("facts.json");
    std::fs::write(
        &facts,
        r#"{"files":[
            {"path":"src/a.ts","imports":[{"specifier":"./b","line":1}]},
            {"path":"./src/a.ts"},
            {"path":"src/b.ts","imports":[{"specifier":"./a","line":2}]}
        ]}"#,
    )
    .unwrap();
    let output = archgraph_in(
        dir.path(),
        &["analyze", facts.to_str().unwrap(), "--format", "json"],
    );
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report = parse_json(&output);
    assert_eq!(report["summary"]["circular_dependencies"], 1);
    assert_eq!(
        report["violations"][0]["cycle"],
        serde_json::json!(["src/a.ts", "src/b.ts"])
    );
}

#[test]
fn test_line_zero_exits_with_error() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let facts = dir.path().join("facts.json");
    std::fs::write(
        &facts,
        r#"{"files":[{"path":"src/a.ts","imports":[{"specifier":"./b","line":0}]}]}"#,
    )
    .unwrap();
    let output = archgraph_in(dir.path(), &["analyze", facts.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line number 0"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_config_exits_with_error() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[scoring.weights]\nblocked = 1\ncircular = 9\n").unwrap();
    let output = archgraph_in(
        dir.path(),
        &[
            "analyze",
            &fixture("layered-ts.json"),
            "--config",
            config.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("monotonic"), "{stderr}");
}

#[test]
fn test_missing_facts_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(dir.path(), &["analyze", "does-not-exist.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read facts file"));
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(dir.path(), &["init"]);
    assert!(output.status.success(), "init should succeed");

    let config_path = dir.path().join(".archgraph.toml");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[project]"));
    assert!(content.contains("[scoring.weights]"));

    let again = archgraph_in(dir.path(), &["init"]);
    assert_eq!(again.status.code(), Some(2), "second init without --force should fail");
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));
}

#[test]
fn test_init_with_preset_is_used_by_analyze() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(dir.path(), &["init", "--preset", "layered"]);
    assert!(output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".archgraph.toml")).unwrap();
    assert!(content.contains("\npreset = \"layered\""));

    let output = archgraph_in(
        dir.path(),
        &["check", &fixture("layered-ts.json"), "--format", "json"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(parse_json(&output)["check"]["blocked_count"], 1);
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archgraph_in(
        dir.path(),
        &["-vv", "analyze", &fixture("clean-python.json"), "--format", "json"],
    );
    assert!(output.status.success());
    // stdout stays parseable JSON while logs go to stderr
    parse_json(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("dependency graph built"));
}

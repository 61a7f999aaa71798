//! End-to-end integration tests for the conformance harness
//!
//! These tests run shell fixtures standing in for the generated execution
//! test executable and verify:
//! 1. Block extraction from realistic output
//! 2. Stage-by-stage failure reporting (launch, stderr, parse, comparison)
//! 3. The `conformance` binary's exit codes and output

#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use conformance::testing::{
    execute, run_scenario, ComparedField, Mismatch, RunOptions, Scenario,
    REFERENCE_PROGRAM_OUTPUT,
};
use conformance::{find_block, parse_output, BlockName, Error, Stage};

/// Path to a fixture script
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Reference scenario running a fixture through `sh`
fn fixture_scenario(name: &str) -> Scenario {
    Scenario {
        executable: PathBuf::from("sh"),
        args: vec![fixture(name).display().to_string()],
        ..Scenario::reference()
    }
}

fn quiet() -> RunOptions {
    RunOptions {
        quiet: true,
        ..RunOptions::default()
    }
}

/// Write a scenario file for a fixture into a temp directory
fn write_scenario_file(dir: &tempfile::TempDir, fixture_name: &str) -> PathBuf {
    let path = dir.path().join(format!("{}.yaml", fixture_name));
    let content = format!(
        r#"
name: {name}
description: fixture {name}
executable: sh
args: ["{script}"]
input: yankee
expect:
  program_output: {expected:?}
"#,
        name = fixture_name.trim_end_matches(".sh"),
        script = fixture(fixture_name).display(),
        expected = REFERENCE_PROGRAM_OUTPUT,
    );
    fs::write(&path, content).expect("Failed to write scenario");
    path
}

/// Output from a conformance command
#[derive(Debug)]
struct CliOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

/// Run the conformance binary with an isolated config directory
fn run_cli(config_home: &tempfile::TempDir, args: &[&str], stdin: Option<&str>) -> CliOutput {
    let mut child = Command::new(env!("CARGO_BIN_EXE_conformance"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run conformance");

    {
        let mut child_stdin = child.stdin.take().unwrap();
        if let Some(text) = stdin {
            child_stdin
                .write_all(text.as_bytes())
                .expect("Failed to write stdin");
        }
    }

    let output = child.wait_with_output().expect("Failed to wait for conformance");

    CliOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        code: output.status.code(),
    }
}

// ============== Block parsing ==============

#[test]
fn test_blocks_recovered_in_any_order() {
    let contents = [
        (BlockName::Assembly, "main:\n  push rbp\n  ret\n"),
        (BlockName::MachineCode, "55 48 89 e5 \nc3 "),
        (BlockName::ProgramOutput, "1\n1\n2\n\nHello world!\n"),
        (BlockName::ReadBuffer, "  yankee\t"),
    ];

    for rotation in 0..contents.len() {
        let mut ordered = contents.to_vec();
        ordered.rotate_left(rotation);
        ordered.swap(0, 2);

        let output: String = ordered
            .iter()
            .map(|(name, content)| format!("BEGIN {name}\n{content}END {name}\n"))
            .collect();

        let parsed = parse_output(&output).unwrap();
        for (name, content) in &contents {
            assert_eq!(parsed.get(*name), *content, "block {} in {:?}", name, ordered);
        }
    }
}

#[test]
fn test_each_missing_marker_names_its_block() {
    let well_formed: String = BlockName::ALL
        .iter()
        .map(|name| format!("BEGIN {name}\ncontent of {name}\nEND {name}\n"))
        .collect();

    for name in BlockName::ALL {
        let without_begin = well_formed.replace(&name.begin_marker(), "");
        match parse_output(&without_begin) {
            Err(Error::MissingBeginMarker { block }) => assert_eq!(block, name),
            other => panic!("Expected MissingBeginMarker for {}, got {:?}", name, other),
        }

        let without_end = well_formed.replace(&name.end_marker(), "");
        match parse_output(&without_end) {
            Err(Error::MissingEndMarker { block }) => assert_eq!(block, name),
            other => panic!("Expected MissingEndMarker for {}, got {:?}", name, other),
        }

        // Other blocks are still found when queried on their own
        for other in BlockName::ALL.into_iter().filter(|other| *other != name) {
            assert_eq!(
                find_block(&without_begin, other).unwrap(),
                format!("content of {other}\n")
            );
        }
    }
}

#[test]
fn test_end_before_begin_is_out_of_order() {
    let output = "BEGIN assembly\nret\nEND assembly\n\
                  END machine code\nc3\nBEGIN machine code\n\
                  BEGIN program output\nEND program output\n\
                  BEGIN read buffer\nEND read buffer\n";
    match parse_output(output) {
        Err(e @ Error::OutOfOrderMarkers { .. }) => {
            assert_eq!(e.block(), Some(BlockName::MachineCode));
            assert_eq!(
                e.to_string(),
                "Found end marker before begin marker for block: machine code"
            );
        }
        other => panic!("Expected OutOfOrderMarkers, got {:?}", other),
    }
}

// ============== Harness runs ==============

#[tokio::test]
async fn test_reference_executable_passes() {
    let (parsed, mismatches) = execute(&fixture_scenario("reference.sh")).await.unwrap();

    assert!(mismatches.is_empty(), "unexpected mismatches: {:?}", mismatches);
    assert_eq!(parsed.program_output(), REFERENCE_PROGRAM_OUTPUT);
    assert_eq!(parsed.read_buffer(), "yankee");
    assert!(parsed.assembly().starts_with("main:\n"));
    assert!(parsed.machine_code().ends_with("c3 "));
}

#[tokio::test]
async fn test_wrong_read_buffer_reports_one_mismatch() {
    let (_, mismatches) = execute(&fixture_scenario("wrong_read_buffer.sh"))
        .await
        .unwrap();

    assert_eq!(
        mismatches,
        vec![Mismatch {
            field: ComparedField::ReadBuffer,
            actual: "tango".to_string(),
            expected: "yankee".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_different_input_changes_expected_read_buffer() {
    let scenario = Scenario {
        input: "tango".to_string(),
        ..fixture_scenario("wrong_read_buffer.sh")
    };
    let (_, mismatches) = execute(&scenario).await.unwrap();
    assert!(mismatches.is_empty(), "unexpected mismatches: {:?}", mismatches);
}

#[tokio::test]
async fn test_stderr_output_fails_before_comparison() {
    let scenario = fixture_scenario("stderr_output.sh");

    match execute(&scenario).await {
        Err(Error::UnexpectedStderrOutput(stderr)) => {
            assert_eq!(stderr, "warning: unaligned stack\n");
        }
        other => panic!("Expected UnexpectedStderrOutput, got {:?}", other),
    }

    let result = run_scenario(&scenario, &quiet()).await.unwrap();
    assert!(!result.passed);
    assert_eq!(result.failed_stage, Some(Stage::StderrCheck));
    assert!(result.mismatches.is_empty());
}

#[tokio::test]
async fn test_nonzero_exit_is_launch_failure() {
    let result = run_scenario(&fixture_scenario("exit_failure.sh"), &quiet())
        .await
        .unwrap();
    assert!(!result.passed);
    assert_eq!(result.failed_stage, Some(Stage::Launch));
    let error = result.error.unwrap();
    assert!(error.contains("139"), "error: {}", error);
}

#[tokio::test]
async fn test_missing_executable_is_launch_failure() {
    let scenario = Scenario {
        executable: PathBuf::from("/nonexistent/execution_test_executable"),
        ..Scenario::reference()
    };
    let err = execute(&scenario).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Launch));
}

#[tokio::test]
async fn test_missing_end_marker_is_parse_failure() {
    match execute(&fixture_scenario("missing_end_marker.sh")).await {
        Err(Error::MissingEndMarker { block }) => assert_eq!(block, BlockName::MachineCode),
        other => panic!("Expected MissingEndMarker, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scenario_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_scenario_file(&dir, "reference.sh");

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.name, "reference");
    assert_eq!(scenario.base_dir.as_deref(), Some(dir.path()));

    let result = run_scenario(&scenario, &quiet()).await.unwrap();
    assert!(result.passed, "{:?}", result);
    assert!(result.blocks.is_none());
}

// ============== CLI ==============

#[test]
fn test_cli_run_passes() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_scenario_file(&dir, "reference.sh");

    let output = run_cli(&dir, &["run", scenario.to_str().unwrap()], None);
    assert_eq!(output.code, Some(0), "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("Test Passed"), "stdout: {}", output.stdout);
}

#[test]
fn test_cli_run_mismatch_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_scenario_file(&dir, "wrong_read_buffer.sh");

    let output = run_cli(&dir, &["run", scenario.to_str().unwrap()], None);
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("wrong read buffer"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("\"tango\""), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("\"yankee\""), "stdout: {}", output.stdout);
    assert!(
        output.stderr.contains("failed at comparison stage"),
        "stderr: {}",
        output.stderr
    );
}

#[test]
fn test_cli_run_json() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write_scenario_file(&dir, "stderr_output.sh");

    let output = run_cli(&dir, &["run", scenario.to_str().unwrap(), "--json"], None);
    assert_eq!(output.code, Some(1));

    let result: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(result["name"], "stderr_output");
    assert_eq!(result["passed"], false);
    assert_eq!(result["failed_stage"], "stderr_check");
}

// XDG_CONFIG_HOME only applies on Linux
#[cfg(target_os = "linux")]
#[test]
fn test_cli_run_uses_config_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("conformance-harness");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[defaults]\nexecutable = \"/nonexistent/exec\"\n\n[report]\ncolor = false\n",
    )
    .unwrap();

    let output = run_cli(&dir, &["run"], None);
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("✗ launch"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("/nonexistent/exec"), "stdout: {}", output.stdout);
}

#[test]
fn test_cli_parse_single_block() {
    let dir = tempfile::tempdir().unwrap();
    let captured = dir.path().join("stdout.txt");
    fs::write(
        &captured,
        "BEGIN assembly\nret\nEND assembly\nBEGIN read buffer\nyankeeEND read buffer\n",
    )
    .unwrap();

    let output = run_cli(
        &dir,
        &["parse", captured.to_str().unwrap(), "--block", "read buffer"],
        None,
    );
    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert_eq!(output.stdout, "yankee");
}

#[test]
fn test_cli_parse_reports_missing_block() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(
        &dir,
        &["parse", "-"],
        Some("BEGIN assembly\nret\nEND assembly\n"),
    );
    assert_eq!(output.code, Some(1));
    assert!(
        output
            .stderr
            .contains("Did not find begin marker for block: machine code"),
        "stderr: {}",
        output.stderr
    );
}

//! Test runner implementation
//!
//! Runs a scenario through the harness stages (launch, stderr check, parse,
//! comparison) and reports which stage failed and why.

use colored::Colorize;
use serde::Serialize;

use crate::blocks::{parse_output, BlockName, ParsedOutput};
use crate::common::{Result, Stage};

use super::compare::{compare, Mismatch};
use super::config::Scenario;
use super::process::{resolve_program, run_executable};

/// Stages in the order a run goes through them
const STAGES: [Stage; 4] = [
    Stage::Launch,
    Stage::StderrCheck,
    Stage::Parse,
    Stage::Comparison,
];

/// Options controlling how a run is reported
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print extra detail for each stage
    pub verbose: bool,
    /// Print the assembly and machine code blocks when a run fails
    pub dump_blocks_on_failure: bool,
    /// Suppress the human-readable report
    pub quiet: bool,
}

/// Result of a test run
#[derive(Debug, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    /// Stage that aborted the run, or `comparison` when values mismatched
    pub failed_stage: Option<Stage>,
    pub mismatches: Vec<Mismatch>,
    pub error: Option<String>,
    /// Extracted blocks, kept on failure for inspection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<ParsedOutput>,
}

/// Run the harness stages for a scenario.
///
/// Launch, stderr and parse failures abort the run with an error. Value
/// mismatches are the run's assertions and are all returned.
pub async fn execute(scenario: &Scenario) -> Result<(ParsedOutput, Vec<Mismatch>)> {
    let program = resolve_program(&scenario.executable, scenario.base_dir.as_deref())?;

    let captured = run_executable(&program, &scenario.args, &scenario.input).await?;

    if let Err(e) = captured.check_stderr() {
        tracing::warn!(
            program = %program.display(),
            stderr_len = captured.stderr.len(),
            "Executable wrote to stderr"
        );
        return Err(e);
    }

    let parsed = parse_output(&captured.stdout)?;
    let mismatches = compare(&parsed, scenario);

    Ok((parsed, mismatches))
}

/// Run a scenario and print a report
pub async fn run_scenario(scenario: &Scenario, options: &RunOptions) -> Result<TestResult> {
    tracing::info!(scenario = %scenario.name, executable = %scenario.executable.display(), "Running scenario");

    if !options.quiet {
        println!(
            "\n{} {}",
            "Running Test:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
        if options.verbose {
            println!(
                "  Executable: {}",
                scenario.executable.display().to_string().dimmed()
            );
            println!("  Input: {}", format!("{:?}", scenario.input).dimmed());
        }
        println!();
    }

    let result = match execute(scenario).await {
        Ok((parsed, mismatches)) => {
            let passed = mismatches.is_empty();
            TestResult {
                name: scenario.name.clone(),
                passed,
                failed_stage: (!passed).then_some(Stage::Comparison),
                mismatches,
                error: None,
                blocks: (!passed).then_some(parsed),
            }
        }
        Err(e) => {
            let Some(stage) = e.stage() else {
                return Err(e);
            };
            TestResult {
                name: scenario.name.clone(),
                passed: false,
                failed_stage: Some(stage),
                mismatches: Vec::new(),
                error: Some(e.to_string()),
                blocks: None,
            }
        }
    };

    if result.passed {
        tracing::info!(scenario = %result.name, "Scenario passed");
    } else {
        tracing::info!(
            scenario = %result.name,
            stage = ?result.failed_stage,
            mismatches = result.mismatches.len(),
            "Scenario failed"
        );
    }

    if !options.quiet {
        print_report(&result, options);
    }

    Ok(result)
}

fn print_report(result: &TestResult, options: &RunOptions) {
    for stage in STAGES {
        match result.failed_stage {
            Some(failed) if failed == stage => {
                println!("  {} {}", "✗".red(), stage);
                if let Some(error) = &result.error {
                    for line in error.lines() {
                        println!("      {}", line);
                    }
                }
                for mismatch in &result.mismatches {
                    print_mismatch(mismatch, options.verbose);
                }
                break;
            }
            _ => println!("  {} {}", "✓".green(), stage),
        }
    }

    if !result.passed && options.dump_blocks_on_failure {
        if let Some(blocks) = &result.blocks {
            for name in [BlockName::Assembly, BlockName::MachineCode] {
                println!("\n  {}", format!("BEGIN {}", name).dimmed());
                print!("{}", blocks.get(name));
                println!("  {}", format!("END {}", name).dimmed());
            }
        }
    }

    if result.passed {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            "Test Passed".green().bold()
        );
    } else {
        println!("\n{} {}\n", "✗".red().bold(), "Test Failed".red().bold());
    }
}

fn print_mismatch(mismatch: &Mismatch, verbose: bool) {
    println!("      wrong {}:", mismatch.field.block());
    println!("        actual:   {}", format!("{:?}", mismatch.actual).red());
    println!("        expected: {}", format!("{:?}", mismatch.expected).green());

    if verbose {
        println!("      actual (raw):");
        print!("{}", mismatch.actual);
        println!("      expected (raw):");
        print!("{}", mismatch.expected);
    }
}

//! CLI command handling
//!
//! Dispatches CLI commands to the harness and formats output.

use std::io::Read;
use std::path::Path;

use crate::blocks::{find_block, parse_output, BlockName};
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result, Stage};
use crate::testing::{run_scenario, RunOptions, Scenario};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            scenario,
            executable,
            input,
            verbose,
            json,
        } => {
            let config = Config::load()?;
            if !config.report.color {
                colored::control::set_override(false);
            }

            let mut scenario = match scenario {
                Some(path) => Scenario::load(&path)?,
                None => Scenario {
                    executable: config.defaults.executable.clone(),
                    input: config.defaults.input.clone(),
                    ..Scenario::reference()
                },
            };

            // Overrides come from the command line, so resolve against cwd
            if let Some(executable) = executable {
                scenario.executable = executable;
                scenario.base_dir = None;
            }
            if let Some(input) = input {
                scenario.input = input;
            }

            let options = RunOptions {
                verbose,
                dump_blocks_on_failure: config.report.dump_blocks_on_failure,
                quiet: json,
            };

            let result = run_scenario(&scenario, &options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }

            if result.passed {
                Ok(())
            } else {
                Err(Error::TestFailed {
                    name: result.name,
                    stage: result.failed_stage.unwrap_or(Stage::Comparison),
                })
            }
        }

        Commands::Parse { file, block } => {
            let output = read_captured(&file)?;

            match block {
                Some(name) => print!("{}", find_block(&output, name)?),
                None => {
                    let parsed = parse_output(&output)?;
                    for name in BlockName::ALL {
                        println!("BEGIN {}", name);
                        print!("{}", parsed.get(name));
                        println!("END {}", name);
                    }
                }
            }

            Ok(())
        }
    }
}

fn read_captured(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut output = String::new();
        std::io::stdin().read_to_string(&mut output)?;
        return Ok(output);
    }

    std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

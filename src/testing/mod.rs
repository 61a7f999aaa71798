//! Execution test harness
//!
//! Runs an executable produced by the code generator, extracts the blocks it
//! prints and checks the program output and read buffer against a scenario.

mod compare;
mod config;
mod process;
mod runner;

pub use compare::{compare, ComparedField, Mismatch};
pub use config::*;
pub use process::{resolve_program, run_executable, CapturedOutput};
pub use runner::{execute, run_scenario, RunOptions, TestResult};

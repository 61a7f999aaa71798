//! Execution conformance harness
//!
//! Runs a code-generation test executable with fixed stdin input, extracts
//! the `BEGIN <name>` / `END <name>` delimited blocks it prints, and checks
//! its program output and read buffer against expected values.

pub mod blocks;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use blocks::{find_block, parse_output, BlockName, ParsedOutput};
pub use common::{Error, Result, Stage};

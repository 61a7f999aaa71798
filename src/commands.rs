//! CLI command definitions
//!
//! Defines the clap commands for the conformance CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::blocks::BlockName;

#[derive(Subcommand)]
pub enum Commands {
    /// Run an execution test scenario
    ///
    /// Without a scenario file, runs the reference scenario using the
    /// configured default executable and input.
    Run {
        /// Path to a YAML test scenario file
        scenario: Option<PathBuf>,

        /// Executable to run instead of the scenario's
        #[arg(long, short)]
        executable: Option<PathBuf>,

        /// Stdin input instead of the scenario's
        #[arg(long, short)]
        input: Option<String>,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        /// Print the result as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Extract the delimited blocks from captured executable output
    Parse {
        /// File with the captured stdout ("-" for stdin)
        file: PathBuf,

        /// Only print this block ("assembly", "machine code", "program output", "read buffer")
        #[arg(long, short)]
        block: Option<BlockName>,
    },
}

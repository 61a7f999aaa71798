//! Error types for the conformance harness
//!
//! Each harness error maps to the stage of a run that produced it, so a
//! failed run can always say where it stopped.

use std::io;
use thiserror::Error;

use crate::blocks::BlockName;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of a harness run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Spawning the executable and waiting for it to exit
    Launch,
    /// Verifying that nothing was written to stderr
    StderrCheck,
    /// Extracting the delimited blocks from stdout
    Parse,
    /// Comparing extracted blocks against expected values
    Comparison,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Launch => "launch",
            Stage::StderrCheck => "stderr-check",
            Stage::Parse => "parse",
            Stage::Comparison => "comparison",
        };
        f.write_str(name)
    }
}

/// Main error type for the conformance harness
#[derive(Error, Debug)]
pub enum Error {
    // === Process Errors ===
    #[error("Failed to run '{program}': {reason}")]
    Launch { program: String, reason: String },

    #[error("Executable wrote to stderr:\n{0}")]
    UnexpectedStderrOutput(String),

    // === Block Errors ===
    #[error("Did not find begin marker for block: {block}")]
    MissingBeginMarker { block: BlockName },

    #[error("Did not find end marker for block: {block}")]
    MissingEndMarker { block: BlockName },

    #[error("Found end marker before begin marker for block: {block}")]
    OutOfOrderMarkers { block: BlockName },

    // === Test Errors ===
    #[error("Test '{name}' failed at {stage} stage")]
    TestFailed { name: String, stage: Stage },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a launch error for a program
    pub fn launch(program: &str, reason: impl std::fmt::Display) -> Self {
        Self::Launch {
            program: program.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The run stage this error aborts, if it is a harness error
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Launch { .. } => Some(Stage::Launch),
            Error::UnexpectedStderrOutput(_) => Some(Stage::StderrCheck),
            Error::MissingBeginMarker { .. }
            | Error::MissingEndMarker { .. }
            | Error::OutOfOrderMarkers { .. } => Some(Stage::Parse),
            Error::TestFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The block a parse error refers to
    pub fn block(&self) -> Option<BlockName> {
        match self {
            Error::MissingBeginMarker { block }
            | Error::MissingEndMarker { block }
            | Error::OutOfOrderMarkers { block } => Some(*block),
            _ => None,
        }
    }
}

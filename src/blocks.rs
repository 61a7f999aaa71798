//! Block extraction from captured executable output
//!
//! The executable under test prints named sections of the form
//!
//! ```text
//! BEGIN <name>
//! <content>
//! END <name>
//! ```
//!
//! Extraction is plain substring search on the marker literals. Each block is
//! looked up independently on the full text, so the order in which blocks
//! appear does not matter and anything outside the four known blocks is
//! ignored.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::common::{Error, Result};

/// The four blocks the executable is required to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockName {
    #[serde(rename = "assembly")]
    Assembly,
    #[serde(rename = "machine code")]
    MachineCode,
    #[serde(rename = "program output")]
    ProgramOutput,
    #[serde(rename = "read buffer")]
    ReadBuffer,
}

impl BlockName {
    /// All blocks, in extraction order
    pub const ALL: [BlockName; 4] = [
        BlockName::Assembly,
        BlockName::MachineCode,
        BlockName::ProgramOutput,
        BlockName::ReadBuffer,
    ];

    /// The literal name used in the markers
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockName::Assembly => "assembly",
            BlockName::MachineCode => "machine code",
            BlockName::ProgramOutput => "program output",
            BlockName::ReadBuffer => "read buffer",
        }
    }

    /// `BEGIN <name>\n`
    pub fn begin_marker(&self) -> String {
        format!("BEGIN {}\n", self.as_str())
    }

    /// `END <name>\n`
    pub fn end_marker(&self) -> String {
        format!("END {}\n", self.as_str())
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BlockName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| {
                Error::Config(format!(
                    "Unknown block '{}'. Expected one of: {}",
                    s,
                    BlockName::ALL.map(|n| n.as_str()).join(", ")
                ))
            })
    }
}

/// The four blocks extracted from one run's stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedOutput {
    assembly: String,
    machine_code: String,
    program_output: String,
    read_buffer: String,
}

impl ParsedOutput {
    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn machine_code(&self) -> &str {
        &self.machine_code
    }

    pub fn program_output(&self) -> &str {
        &self.program_output
    }

    pub fn read_buffer(&self) -> &str {
        &self.read_buffer
    }

    /// Look up a block by name
    pub fn get(&self, name: BlockName) -> &str {
        match name {
            BlockName::Assembly => &self.assembly,
            BlockName::MachineCode => &self.machine_code,
            BlockName::ProgramOutput => &self.program_output,
            BlockName::ReadBuffer => &self.read_buffer,
        }
    }
}

/// Find the content of a single block.
///
/// The content is everything between the end of the first `BEGIN <name>\n`
/// and the start of the first `END <name>\n`, returned verbatim.
///
/// Precondition: block content never contains a marker line of any block.
/// The search does not detect overlapping blocks, and when a marker appears
/// more than once the first occurrence wins.
pub fn find_block(output: &str, name: BlockName) -> Result<&str> {
    let begin_marker = name.begin_marker();
    let end_marker = name.end_marker();

    let begin = output
        .find(&begin_marker)
        .ok_or(Error::MissingBeginMarker { block: name })?;
    let end = output
        .find(&end_marker)
        .ok_or(Error::MissingEndMarker { block: name })?;

    let content_start = begin + begin_marker.len();
    // Also covers an end marker starting inside the begin marker line.
    if end < content_start {
        return Err(Error::OutOfOrderMarkers { block: name });
    }

    Ok(&output[content_start..end])
}

/// Extract all four blocks. The first failing block, in [`BlockName::ALL`]
/// order, aborts the parse.
pub fn parse_output(output: &str) -> Result<ParsedOutput> {
    let parsed = ParsedOutput {
        assembly: find_block(output, BlockName::Assembly)?.to_string(),
        machine_code: find_block(output, BlockName::MachineCode)?.to_string(),
        program_output: find_block(output, BlockName::ProgramOutput)?.to_string(),
        read_buffer: find_block(output, BlockName::ReadBuffer)?.to_string(),
    };

    tracing::debug!(
        assembly_len = parsed.assembly.len(),
        machine_code_len = parsed.machine_code.len(),
        program_output_len = parsed.program_output.len(),
        read_buffer_len = parsed.read_buffer.len(),
        "Parsed output blocks"
    );

    Ok(parsed)
}

//! Test scenario configuration types
//!
//! A scenario names one executable, the input it receives on stdin and the
//! values its `program output` and `read buffer` blocks must hold. Scenarios
//! are loaded from YAML files or built from the reference constants.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Executable produced by the code-generation pipeline
pub const REFERENCE_EXECUTABLE: &str = "./execution_test_executable";

/// Bytes written to the executable's stdin
pub const REFERENCE_INPUT: &str = "yankee";

/// Fibonacci sequence, the write syscall greeting and the result of the
/// calling convention test
pub const REFERENCE_PROGRAM_OUTPUT: &str =
    "1\n1\n2\n3\n5\n8\n13\n21\n34\n55\n89\nHello world!\n1234\n";

/// A complete test scenario
#[derive(Deserialize, Debug, Clone)]
pub struct Scenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Path to the executable under test
    pub executable: PathBuf,
    /// Arguments to pass to the executable
    #[serde(default)]
    pub args: Vec<String>,
    /// Text written to the executable's stdin
    #[serde(default)]
    pub input: String,
    /// Expected block values
    pub expect: Expectations,
    /// Directory relative executable paths resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Expected values for the compared blocks
#[derive(Deserialize, Debug, Clone)]
pub struct Expectations {
    /// Exact content of the `program output` block
    pub program_output: String,
    /// Exact content of the `read buffer` block (default: the scenario input)
    pub read_buffer: Option<String>,
}

impl Scenario {
    /// The scenario exercising the reference execution test executable
    pub fn reference() -> Self {
        Self {
            name: "x86_64 execution".to_string(),
            description: Some(
                "Runs generated machine code and checks its output and read buffer".to_string(),
            ),
            executable: PathBuf::from(REFERENCE_EXECUTABLE),
            args: Vec::new(),
            input: REFERENCE_INPUT.to_string(),
            expect: Expectations {
                program_output: REFERENCE_PROGRAM_OUTPUT.to_string(),
                read_buffer: None,
            },
            base_dir: None,
        }
    }

    /// Load a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let mut scenario = Self::from_yaml(&content)?;
        scenario.base_dir = Some(path.parent().unwrap_or(Path::new(".")).to_path_buf());
        Ok(scenario)
    }

    /// Parse a scenario from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse test scenario: {}", e)))
    }

    /// Expected `read buffer` content
    pub fn expected_read_buffer(&self) -> &str {
        self.expect.read_buffer.as_deref().unwrap_or(&self.input)
    }
}

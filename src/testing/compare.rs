//! Comparison of extracted blocks against expected values

use serde::Serialize;

use crate::blocks::{BlockName, ParsedOutput};

use super::config::Scenario;

/// A block whose value is checked against an expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparedField {
    ProgramOutput,
    ReadBuffer,
}

impl ComparedField {
    pub fn block(&self) -> BlockName {
        match self {
            ComparedField::ProgramOutput => BlockName::ProgramOutput,
            ComparedField::ReadBuffer => BlockName::ReadBuffer,
        }
    }
}

/// A compared block whose content differs from the expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub field: ComparedField,
    pub actual: String,
    pub expected: String,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "wrong {}: got {:?}, expected {:?}",
            self.field.block(),
            self.actual,
            self.expected
        )
    }
}

/// Check `program output` and `read buffer`.
///
/// Both fields are always compared. Assembly and machine code are not.
pub fn compare(parsed: &ParsedOutput, scenario: &Scenario) -> Vec<Mismatch> {
    let checks = [
        (
            ComparedField::ProgramOutput,
            scenario.expect.program_output.as_str(),
        ),
        (ComparedField::ReadBuffer, scenario.expected_read_buffer()),
    ];

    checks
        .into_iter()
        .filter_map(|(field, expected)| {
            let actual = parsed.get(field.block());
            (actual != expected).then(|| Mismatch {
                field,
                actual: actual.to_string(),
                expected: expected.to_string(),
            })
        })
        .collect()
}

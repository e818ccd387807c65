//! Export pass reporting.
//!
//! The assembler never bails at the first problem: encoders return
//! outcomes, everything gets aggregated here, and one run surfaces every
//! unrelated problem it found.

use serde::Serialize;

use crate::container::SectionRecord;
use crate::export::ExportMode;

/// One written section, as reported to the caller.
#[derive(Clone, Debug, Serialize)]
pub struct SectionSummary {
    pub id: u32,
    pub name: &'static str,
    pub offset: u32,
    pub length: u32,
}

impl From<&SectionRecord> for SectionSummary {
    fn from(record: &SectionRecord) -> Self {
        Self {
            id: record.id as u32,
            name: record.id.name(),
            offset: record.offset,
            length: record.length,
        }
    }
}

/// Outcome of the optional validation stage.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationSummary {
    pub structural_violations: Vec<String>,
    /// Present when a reference file was supplied.
    pub byte_mismatches: Option<usize>,
}

impl ValidationSummary {
    pub fn passed(&self) -> bool {
        self.structural_violations.is_empty() && self.byte_mismatches.unwrap_or(0) == 0
    }
}

/// Aggregated outcome of one export pass.
#[derive(Clone, Debug, Serialize)]
pub struct ExportReport {
    pub scene: String,
    pub mode: ExportMode,
    /// Terminal pipeline state, "done" or "failed".
    pub state: String,
    pub sections: Vec<SectionSummary>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub validation: Option<ValidationSummary>,
}

impl ExportReport {
    pub(crate) fn new(scene: String, mode: ExportMode) -> Self {
        Self {
            scene,
            mode,
            state: String::new(),
            sections: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            validation: None,
        }
    }

    /// True when the pass produced a file and validation (if any) passed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.validation.as_ref().map(|v| v.passed()).unwrap_or(true)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

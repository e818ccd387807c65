//! Byte-diff comparator: prove an encode matches a golden reference.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::container::Container;
use crate::util::Result;

/// Default cap on recorded mismatches; the total keeps counting past it.
const DEFAULT_MAX_RECORDS: usize = 100;

/// One differing byte. `None` stands for EOF when the files differ in
/// length.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ByteMismatch {
    pub offset: u64,
    /// Raw tag of the enclosing section, resolved from the reference file's
    /// table (header and table bytes have no section).
    pub section: Option<u32>,
    pub expected: Option<u8>,
    pub actual: Option<u8>,
}

/// Comparison outcome: `total_mismatches == 0` means pass.
#[derive(Clone, Debug, Serialize)]
pub struct DiffReport {
    pub actual_file: PathBuf,
    pub expected_file: PathBuf,
    pub mismatches: Vec<ByteMismatch>,
    pub total_mismatches: usize,
}

impl DiffReport {
    pub fn is_pass(&self) -> bool {
        self.total_mismatches == 0
    }

    /// Human-readable report, one line per recorded mismatch.
    pub fn format_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "compare: {} vs {}",
            self.actual_file.display(),
            self.expected_file.display()
        );
        let _ = writeln!(out, "total mismatches: {}", self.total_mismatches);
        for m in &self.mismatches {
            let fmt = |b: Option<u8>| match b {
                Some(b) => format!("{b:02X}"),
                None => "EOF".into(),
            };
            let section = match m.section {
                Some(id) => format!(" section={id:#06x}"),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "offset {:08X}: expected={} actual={}{}",
                m.offset,
                fmt(m.expected),
                fmt(m.actual),
                section
            );
        }
        if self.total_mismatches > self.mismatches.len() {
            let _ = writeln!(
                out,
                "... {} more not shown",
                self.total_mismatches - self.mismatches.len()
            );
        }
        out
    }
}

/// Byte-for-byte comparator with a configurable record cap.
pub struct ByteDiff {
    max_records: usize,
}

impl Default for ByteDiff {
    fn default() -> Self {
        Self { max_records: DEFAULT_MAX_RECORDS }
    }
}

impl ByteDiff {
    pub fn with_max_records(max_records: usize) -> Self {
        Self { max_records }
    }

    /// Compare `actual` against the golden `expected` file.
    pub fn compare(
        &self,
        actual: impl AsRef<Path>,
        expected: impl AsRef<Path>,
    ) -> Result<DiffReport> {
        let actual = actual.as_ref();
        let expected = expected.as_ref();
        let actual_bytes = std::fs::read(actual)?;
        let expected_bytes = std::fs::read(expected)?;

        // Section attribution comes from the reference table when it parses;
        // a diff against a non-container reference still works, just without
        // section names.
        let reference = Container::open(expected).ok();

        let mut mismatches = Vec::new();
        let mut total = 0usize;
        let len = actual_bytes.len().max(expected_bytes.len());
        for offset in 0..len {
            let a = actual_bytes.get(offset).copied();
            let e = expected_bytes.get(offset).copied();
            if a == e {
                continue;
            }
            total += 1;
            if mismatches.len() < self.max_records {
                let section = reference
                    .as_ref()
                    .and_then(|c| c.enclosing_section(offset as u64))
                    .map(|r| r.id);
                mismatches.push(ByteMismatch { offset: offset as u64, section, expected: e, actual: a });
            }
        }

        Ok(DiffReport {
            actual_file: actual.to_path_buf(),
            expected_file: expected.to_path_buf(),
            mismatches,
            total_mismatches: total,
        })
    }
}

/// Compare two files with the default record cap.
pub fn byte_diff(actual: impl AsRef<Path>, expected: impl AsRef<Path>) -> Result<DiffReport> {
    ByteDiff::default().compare(actual, expected)
}

//! Append-only audit log.
//!
//! The only durable state an export leaves behind besides the output files:
//! one `{timestamp, section, status}` line per event, appended, never
//! rewritten.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::util::Result;

/// One audit event.
#[derive(Clone, Debug)]
pub struct AuditEntry {
    /// Unix timestamp, seconds.
    pub timestamp: u64,
    /// Raw section tag, 0 for pass-level events.
    pub section: u32,
    pub status: String,
}

impl AuditEntry {
    pub fn now(section: u32, status: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { timestamp, section, status: status.into() }
    }
}

/// Audit log handle bound to a file path.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Append entries. Creates the file on first use.
    pub fn append(&self, entries: &[AuditEntry]) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        for entry in entries {
            writeln!(file, "{} {:#06x} {}", entry.timestamp, entry.section, entry.status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("audit.log");
        let log = AuditLog::new(&path);

        log.append(&[AuditEntry { timestamp: 10, section: 0x1001, status: "ok".into() }])?;
        log.append(&[AuditEntry { timestamp: 11, section: 0x2001, status: "ok".into() }])?;

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "10 0x1001 ok");
        assert_eq!(lines[1], "11 0x2001 ok");
        Ok(())
    }
}

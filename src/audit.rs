//! Append-only audit trail of applied filters.
//!
//! Each entry records when a filter ran and a one-line parameter summary.
//! The log lives in memory and can be exported verbatim to a text file;
//! growth is unbounded by design, one entry per filter invocation.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::error::Result;

/// One audit line: timestamp, module label, and parameter summary.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// When the filter was applied.
    pub timestamp: DateTime<Local>,
    /// Which filter ran ("redact", "watermark", "obfuscate").
    pub module: String,
    /// Human-readable parameter summary.
    pub summary: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current local time.
    #[must_use]
    pub fn now(module: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            module: module.into(),
            summary: summary.into(),
        }
    }
}

impl std::fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} → {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.module,
            self.summary
        )
    }
}

/// In-memory, append-only list of audit entries.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    /// The recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write every entry as one line to `path`, overwriting the file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be written.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        for entry in &self.entries {
            writeln!(file, "{entry}")?;
        }
        Ok(())
    }
}

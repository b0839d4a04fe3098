//! Append-only JSON Lines audit log.
//!
//! Uses JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object
//! - Partial file corruption only affects individual lines
//! - Can be read even if a write was interrupted
//!
//! Files rotate daily and are only ever opened in append mode: an existing
//! record can never be truncated or rewritten, only followed by newer ones.

use crate::error::AuditResult;
use crate::event::AuditEnvelope;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Active writer state for the current daily file.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// Append-only JSON Lines writer for audit envelopes.
pub struct AuditLog {
    /// Base directory for output files.
    base_dir: PathBuf,
    /// Buffer of pending envelopes.
    buffer: Vec<AuditEnvelope>,
    /// Maximum buffer size before an automatic flush.
    max_buffer_size: usize,
    /// Active writer (open until date rotation).
    active_writer: Option<ActiveWriter>,
}

impl AuditLog {
    /// Create a new audit log rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>, max_buffer_size: usize) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&base_dir) {
            warn!(?e, dir = %base_dir.display(), "Failed to create audit directory");
        }

        Self {
            base_dir,
            buffer: Vec::with_capacity(max_buffer_size.max(1)),
            max_buffer_size: max_buffer_size.max(1),
            active_writer: None,
        }
    }

    /// Queue an envelope, flushing when the buffer fills.
    pub fn append(&mut self, envelope: AuditEnvelope) -> AuditResult<()> {
        self.buffer.push(envelope);

        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Queue an envelope and flush immediately.
    ///
    /// Decisions and orders use this path: a record is not final until it is
    /// on disk.
    pub fn append_durable(&mut self, envelope: AuditEnvelope) -> AuditResult<()> {
        self.buffer.push(envelope);
        self.flush()
    }

    /// Close the active writer.
    fn close_active_writer(&mut self) {
        if let Some(mut active) = self.active_writer.take() {
            if let Err(e) = active.writer.flush() {
                warn!(?e, "Failed to flush audit writer on close");
            }
            info!(
                date = %active.date,
                records = active.records_written,
                "Closed audit log file"
            );
        }
    }

    /// Open a new writer for the given date.
    fn create_new_writer(&mut self, date: &str) -> AuditResult<()> {
        let filename = self.base_dir.join(format!("audit_{date}.jsonl"));

        info!(filename = %filename.display(), "Opening audit log (append mode)");

        // Append mode: never truncates existing records.
        let file = OpenOptions::new().create(true).append(true).open(&filename)?;

        self.active_writer = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });

        Ok(())
    }

    /// Flush the buffer to the current daily file.
    pub fn flush(&mut self) -> AuditResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();

        let needs_rotation = self
            .active_writer
            .as_ref()
            .map(|w| w.date != today)
            .unwrap_or(false);
        if needs_rotation {
            self.close_active_writer();
        }

        if self.active_writer.is_none() {
            self.create_new_writer(&today)?;
        }

        let record_count = self.buffer.len();
        {
            let active = self
                .active_writer
                .as_mut()
                .expect("active_writer opened above");

            for envelope in self.buffer.drain(..) {
                let line = serde_json::to_string(&envelope)?;
                active.writer.write_all(line.as_bytes())?;
                active.writer.write_all(b"\n")?;
                active.records_written += 1;
            }
            active.writer.flush()?;
        }

        debug!(records = record_count, "Flushed audit records");
        Ok(())
    }

    /// Records still waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Drop for AuditLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, "Failed to flush audit log on drop");
        }
        self.close_active_writer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AuditEvent;
    use tempfile::TempDir;
    use warden_core::{GovernanceAction, GovernanceDecision, IntentId};

    fn sample_envelope() -> AuditEnvelope {
        AuditEnvelope::now(AuditEvent::GovernanceDecision {
            decision: GovernanceDecision::new(
                IntentId::new(),
                "monarch",
                GovernanceAction::HardPull,
                "drawdown breach",
                Vec::new(),
                vec!["daily_drawdown_breach".into()],
                0.8,
                4,
            ),
        })
    }

    fn read_lines(dir: &TempDir) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            lines.extend(content.lines().map(|l| l.to_string()));
        }
        lines
    }

    #[test]
    fn test_append_durable_writes_immediately() {
        let dir = TempDir::new().unwrap();
        let mut log = AuditLog::new(dir.path(), 100);

        log.append_durable(sample_envelope()).unwrap();
        assert_eq!(log.pending(), 0);

        let lines = read_lines(&dir);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("governance.decision"));
    }

    #[test]
    fn test_buffered_append_flushes_at_capacity() {
        let dir = TempDir::new().unwrap();
        let mut log = AuditLog::new(dir.path(), 3);

        log.append(sample_envelope()).unwrap();
        log.append(sample_envelope()).unwrap();
        assert_eq!(log.pending(), 2);

        log.append(sample_envelope()).unwrap();
        assert_eq!(log.pending(), 0);
        assert_eq!(read_lines(&dir).len(), 3);
    }

    #[test]
    fn test_reopen_appends_not_truncates() {
        let dir = TempDir::new().unwrap();

        {
            let mut log = AuditLog::new(dir.path(), 1);
            log.append_durable(sample_envelope()).unwrap();
        }
        {
            let mut log = AuditLog::new(dir.path(), 1);
            log.append_durable(sample_envelope()).unwrap();
        }

        assert_eq!(read_lines(&dir).len(), 2);
    }

    #[test]
    fn test_every_line_parses_back() {
        let dir = TempDir::new().unwrap();
        let mut log = AuditLog::new(dir.path(), 1);
        log.append_durable(sample_envelope()).unwrap();
        log.append_durable(sample_envelope()).unwrap();

        for line in read_lines(&dir) {
            let envelope: AuditEnvelope = serde_json::from_str(&line).unwrap();
            assert_eq!(envelope.event.name(), "governance.decision");
        }
    }
}

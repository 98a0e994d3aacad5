//! Run log stream - the externally observable progress signal
//!
//! A broadcast bus carries human-readable log lines from the workflow to
//! its consumers: the terminal printer in the binary and a per-run JSONL
//! file under the runs directory. Emission is fire-and-forget; a consumer
//! that lags simply misses lines, it never blocks the run.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use templatepress::LogSink;

/// Default channel capacity (log lines)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A single timestamped line as persisted to `run.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

/// Central bus for a run's log lines
///
/// The workflow emits through [`Reporter`] handles; consumers subscribe and
/// drain at their own pace.
pub struct LogBus {
    tx: broadcast::Sender<String>,
}

impl LogBus {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "LogBus::new: creating bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a cheap-to-clone emitter handle.
    pub fn reporter(&self) -> Reporter {
        Reporter { tx: self.tx.clone() }
    }

    /// Subscribe to receive lines emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for LogBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle components use to emit log lines without owning the bus
#[derive(Clone)]
pub struct Reporter {
    tx: broadcast::Sender<String>,
}

impl Reporter {
    /// Fire-and-forget: lines emitted with no subscribers are dropped.
    pub fn emit(&self, message: impl Into<String>) {
        let _ = self.tx.send(message.into());
    }
}

impl LogSink for Reporter {
    fn log(&self, message: &str) {
        self.emit(message);
    }
}

/// Writes every log line of one run to `<runs_dir>/<run_id>/run.jsonl`
pub struct RunLogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RunLogWriter {
    /// Create the run directory and open its log file for appending.
    pub fn create(runs_dir: impl AsRef<Path>, run_id: &str) -> eyre::Result<Self> {
        let run_dir = runs_dir.as_ref().join(run_id);
        fs::create_dir_all(&run_dir)?;

        let path = run_dir.join("run.jsonl");
        debug!(?path, "RunLogWriter::create: opening log file");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Append one line as a timestamped JSON entry.
    pub fn write_line(&mut self, message: &str) -> eyre::Result<()> {
        let entry = LogEntry::new(message);
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the JSONL file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume lines from the bus until it closes, persisting each one.
    ///
    /// Meant to be spawned as a background task alongside the workflow.
    pub async fn run(mut self, mut rx: broadcast::Receiver<String>) {
        loop {
            match rx.recv().await {
                Ok(line) => {
                    if let Err(e) = self.write_line(&line) {
                        error!(error = %e, "RunLogWriter: failed to write line");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "RunLogWriter: lagged behind, missed lines");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("RunLogWriter: channel closed, shutting down");
                    break;
                }
            }
        }

        let _ = self.writer.flush();
    }
}

/// Read the persisted entries of a run's log file.
pub fn read_run_log(runs_dir: impl AsRef<Path>, run_id: &str) -> eyre::Result<Vec<LogEntry>> {
    let path = runs_dir.as_ref().join(run_id).join("run.jsonl");
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path)?;
    let mut entries = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line, error = %e, "read_run_log: failed to parse line"),
        }
    }
    Ok(entries)
}

//! Append-only action log and per-user reports.
//!
//! The core treats logging as a pure write-sink: [`ActionLog::record`] takes
//! an actor and a free-text description, and nothing in the crate ever parses
//! the log back. [`FileActionLog`] is the production sink (one
//! `id;actor;description;timestamp` line per action); [`MemoryLog`] captures
//! entries for assertions.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::error;

/// Write-sink for operator actions.
///
/// Recording is infallible by contract: implementations deal with their own
/// I/O trouble (and report it through the `log` facade) rather than pushing
/// failures into the control loop.
pub trait ActionLog {
    /// Record one action by `actor`.
    fn record(&mut self, actor: &str, description: &str);
}

/// File-backed action log.
///
/// Lines are `id;actor;description;timestamp` with ids continuing across
/// restarts: construction scans the existing file once for the highest id.
#[derive(Debug)]
pub struct FileActionLog {
    path: PathBuf,
    next_id: u64,
}

impl FileActionLog {
    /// Open (or start) the log at `path`.
    ///
    /// A missing file is fine; the id sequence starts at 1.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let next_id = match File::open(&path) {
            Ok(file) => {
                let max = BufReader::new(file)
                    .lines()
                    .map_while(Result::ok)
                    .filter_map(|line| {
                        line.split(';').next().and_then(|id| id.parse::<u64>().ok())
                    })
                    .max()
                    .unwrap_or(0);
                max + 1
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 1,
            Err(e) => return Err(e),
        };
        Ok(Self { path, next_id })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id the next record will carry.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Extract all of one user's records into `report_<username>.txt` next
    /// to the log file.
    ///
    /// Username matching is case-insensitive. Returns the report path, or
    /// `Ok(None)` when the user has no records, so no empty report file is
    /// left behind.
    pub fn report_for(&self, username: &str) -> std::io::Result<Option<PathBuf>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut matched = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let actor = line.split(';').nth(1).unwrap_or("");
            if actor.eq_ignore_ascii_case(username) {
                matched.push(line);
            }
        }
        if matched.is_empty() {
            return Ok(None);
        }

        let report_path = self
            .path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("report_{username}.txt"));
        let mut report = File::create(&report_path)?;
        for line in &matched {
            writeln!(report, "{line}")?;
        }
        Ok(Some(report_path))
    }
}

impl ActionLog for FileActionLog {
    fn record(&mut self, actor: &str, description: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{};{};{};{}\n", self.next_id, actor, description, timestamp);

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));

        match result {
            Ok(()) => self.next_id += 1,
            Err(e) => error!("failed to append to {}: {e}", self.path.display()),
        }
    }
}

/// In-memory action log for tests.
#[derive(Debug, Default)]
pub struct MemoryLog {
    /// Recorded `(actor, description)` pairs, in order.
    pub entries: Vec<(String, String)>,
}

impl MemoryLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptions recorded so far.
    pub fn descriptions(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, d)| d.as_str()).collect()
    }
}

impl ActionLog for MemoryLog {
    fn record(&mut self, actor: &str, description: &str) {
        self.entries.push((actor.to_string(), description.to_string()));
    }
}

// ============================================================================
// Tests
// ============================================================================

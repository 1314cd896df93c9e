//! Diagnostic log file.
//!
//! Fatal errors are written to `<tmp>/<program>.log` so they survive when the
//! caller (typically kustomize) swallows stderr. A log older than a day is
//! removed at the start of the next run.

use crate::traits::FileSystem;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Logs older than this are pruned
pub const MAX_LOG_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Program name used when argv[0] is unavailable
pub const DEFAULT_PROGRAM_NAME: &str = "inline-replace";

pub struct DiagnosticLog {
    path: PathBuf,
}

impl DiagnosticLog {
    /// Log named after the running executable
    pub fn for_current_program() -> Self {
        let name = std::env::args()
            .next()
            .as_deref()
            .and_then(|arg0| Path::new(arg0).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string());

        Self::at(std::env::temp_dir().join(format!("{}.log", name)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the log if it is older than [`MAX_LOG_AGE`]; returns whether it was removed
    pub fn prune_stale(&self, fs: &dyn FileSystem, now: SystemTime) -> Result<bool> {
        if !fs.is_file(&self.path) {
            return Ok(false);
        }

        let modified = fs.modified(&self.path)?;
        let age = now.duration_since(modified).unwrap_or_default();

        if age > MAX_LOG_AGE {
            fs.remove_file(&self.path)?;
            tracing::debug!(path = %self.path.display(), "pruned stale diagnostic log");
            return Ok(true);
        }

        Ok(false)
    }

    /// Replace the log contents with a timestamped message
    pub fn record(&self, fs: &dyn FileSystem, message: &str, now: SystemTime) -> Result<()> {
        let timestamp: DateTime<Utc> = now.into();
        fs.write(&self.path, &format!("{} {}\n", timestamp.to_rfc3339(), message))
    }
}

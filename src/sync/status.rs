//! Durable status record.
//!
//! One small JSON file per tracked file holds the `(phase, command)` pair.
//! It is re-read on every access and replaced atomically on every
//! transition, so each invocation sees exactly what the previous one sealed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sync::file::atomic_write;
use crate::sync::types::{Command, Phase, SyncError, SyncResult, SyncStatus};

/// On-disk form of the record.
#[derive(Debug, Serialize, Deserialize)]
struct StatusRecord {
    phase: Phase,
    command: Command,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Status record for one tracked file.
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SyncResult<Option<StatusRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SyncError::CorruptStatus {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    /// Read the current status. A missing record means READY.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read or parsed.
    pub fn read(&self) -> SyncResult<SyncStatus> {
        Ok(self
            .load()?
            .map_or(SyncStatus::READY, |r| SyncStatus::new(r.phase, r.command)))
    }

    /// When the record was last written, if it exists and carries a timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read or parsed.
    pub fn updated_at(&self) -> SyncResult<Option<DateTime<Utc>>> {
        Ok(self.load()?.and_then(|r| r.updated_at))
    }

    /// Persist a new record, replacing the old one atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn write(&self, phase: Phase, command: Command) -> SyncResult<()> {
        let record = StatusRecord {
            phase,
            command,
            updated_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&record)?;
        atomic_write(&self.path, json)?;
        Ok(())
    }

    /// Guarded state change.
    ///
    /// Fails with [`SyncError::StateMismatch`] unless the stored phase is
    /// `expected`. With `command` set, `Command::None` may only accompany a
    /// move to READY, and any other command may only start from READY.
    /// Without `command`, the pending command is carried over.
    ///
    /// # Errors
    ///
    /// Returns an error if the guard fails or the record cannot be written.
    pub fn transition(
        &self,
        expected: Phase,
        new: Phase,
        command: Option<Command>,
    ) -> SyncResult<SyncStatus> {
        let current = self.read()?;
        if current.phase != expected {
            return Err(SyncError::StateMismatch {
                expected,
                actual: current.phase,
            });
        }

        let command = match command {
            Some(Command::None) if new != Phase::Ready => {
                return Err(SyncError::InvalidTransition {
                    from: current.phase,
                    to: new,
                    command: Command::None,
                });
            }
            Some(c) if c != Command::None && current.phase != Phase::Ready => {
                return Err(SyncError::InvalidTransition {
                    from: current.phase,
                    to: new,
                    command: c,
                });
            }
            Some(c) => c,
            None => current.command,
        };

        self.write(new, command)?;
        debug!(
            from = %current.phase,
            to = %new,
            command = %command,
            "state transition"
        );

        Ok(SyncStatus::new(new, command))
    }
}

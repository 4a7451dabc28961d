//! Sync state types.
//!
//! The persisted state of a tracked file is a `(phase, command)` pair. The
//! phase says which step of a recipe last completed; the command says which
//! recipe (`pull`, `push` or `sync`) is in flight so `--continue` knows what
//! to resume.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::merge::MergeError;
use crate::remote::RemoteError;
use crate::sync::staging::Role;

/// Step of the sync state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    /// Idle; any operation may start.
    #[default]
    Ready,
    /// Remote snapshot being downloaded; ancestor not yet committed.
    Pull,
    /// Three-way merge in flight.
    Merge,
    /// Merge output is in the working copy, waiting for `sync --continue`.
    Resolve,
    /// Reconciled content being uploaded.
    Push,
}

impl Phase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Pull => "PULL",
            Self::Merge => "MERGE",
            Self::Resolve => "RESOLVE",
            Self::Push => "PUSH",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level recipe that owns the current phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    #[default]
    None,
    Pull,
    Push,
    Sync,
}

impl Command {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Sync => "sync",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted `(phase, command)` pair for one tracked file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub phase: Phase,
    pub command: Command,
}

impl SyncStatus {
    /// Status of a file with no record on disk.
    pub const READY: Self = Self {
        phase: Phase::Ready,
        command: Command::None,
    };

    #[must_use]
    pub const fn new(phase: Phase, command: Command) -> Self {
        Self { phase, command }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.phase, self.command)
    }
}

/// Result of a completed `pull`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PullOutcome {
    /// Where the overwritten working copy was saved, for `pull --force`.
    pub backup: Option<PathBuf>,
}

/// Result of `sync` / `sync --continue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Reconciled and back in READY.
    Completed {
        /// False when the merge result already matched the remote copy.
        uploaded: bool,
    },
    /// Suspended in RESOLVE; the working copy holds conflict markers.
    Conflicts { local: PathBuf },
}

/// Result of `abort`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AbortOutcome {
    /// The recipe that was abandoned.
    pub command: Command,
    /// Whether the pre-sync working copy was restored from the backup.
    pub restored_local: bool,
}

/// One staged role as seen by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFileInfo {
    pub role: Role,
    pub path: PathBuf,
    pub exists: bool,
    pub size: u64,
}

/// Diagnostic snapshot returned by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub name: String,
    pub phase: Phase,
    pub command: Command,
    /// When the record was last written (RFC 3339), if known.
    pub updated_at: Option<String>,
    /// Set when the record exists but could not be read.
    pub record_error: Option<String>,
    pub files: Vec<StagedFileInfo>,
    /// Whether the working copy differs from the ancestor. `None` if either
    /// file is missing.
    pub local_modified: Option<bool>,
    /// Recipe that `--continue` would resume, if any.
    pub resumable: Option<Command>,
    /// Whether `abort` is accepted in the current state.
    pub abortable: bool,
}

impl StatusReport {
    /// Look up a role's entry.
    #[must_use]
    pub fn file(&self, role: Role) -> Option<&StagedFileInfo> {
        self.files.iter().find(|f| f.role == role)
    }
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Another recipe already owns the file.
    #[error("Operation in progress: state is {phase} (command: {command})")]
    OperationInProgress { phase: Phase, command: Command },

    /// `pull` would clobber edits made since the last sync.
    #[error("Local file {} has changes that pull would overwrite", path.display())]
    WouldOverwriteLocalChanges { path: PathBuf },

    #[error("File not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// No common ancestor to merge against.
    #[error("No saved copy ({}) exists for this file", path.display())]
    NoBaseline { path: PathBuf },

    #[error("No key column configured for {file}")]
    MissingKey { file: String },

    /// The stored phase is not the one the caller expected.
    #[error("State is {actual}, expecting {expected}")]
    StateMismatch { expected: Phase, actual: Phase },

    /// A transition that breaks the command rules of the state machine.
    #[error("Invalid transition {from} -> {to} with command {command}")]
    InvalidTransition { from: Phase, to: Phase, command: Command },

    #[error("Nothing to resume: state is {phase} (command: {command})")]
    NothingToResume { phase: Phase, command: Command },

    #[error("Nothing to abort: state is {phase} (command: {command})")]
    NothingToAbort { phase: Phase, command: Command },

    /// The status record exists but cannot be parsed.
    #[error("Corrupt status record {}: {message}", path.display())]
    CorruptStatus { path: PathBuf, message: String },

    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

//! Error types for csvsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=state, 4=precondition, 6=remote, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::merge::MergeError;
use crate::remote::RemoteError;
use crate::sync::{Command, SyncError};

/// Result type alias for csvsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // State (exit 3)
    OperationInProgress,
    NothingToResume,
    NothingToAbort,
    CorruptStatus,

    // Precondition (exit 4)
    MissingFile,
    NoBaseline,
    MissingKey,

    // Local changes (exit 5)
    LocalChanges,

    // Remote (exit 6)
    RemoteAuth,
    RemoteNotFound,
    RemoteError,

    // Config (exit 7)
    ConfigError,
    FileNotConfigured,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Merge (exit 9)
    MergeError,

    // Internal (exit 1)
    StateMismatch,
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::OperationInProgress => "OPERATION_IN_PROGRESS",
            Self::NothingToResume => "NOTHING_TO_RESUME",
            Self::NothingToAbort => "NOTHING_TO_ABORT",
            Self::CorruptStatus => "CORRUPT_STATUS",
            Self::MissingFile => "MISSING_FILE",
            Self::NoBaseline => "NO_BASELINE",
            Self::MissingKey => "MISSING_KEY",
            Self::LocalChanges => "LOCAL_CHANGES",
            Self::RemoteAuth => "REMOTE_AUTH",
            Self::RemoteNotFound => "REMOTE_NOT_FOUND",
            Self::RemoteError => "REMOTE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::FileNotConfigured => "FILE_NOT_CONFIGURED",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::MergeError => "MERGE_ERROR",
            Self::StateMismatch => "STATE_MISMATCH",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::StateMismatch | Self::InternalError => 1,
            Self::OperationInProgress
            | Self::NothingToResume
            | Self::NothingToAbort
            | Self::CorruptStatus => 3,
            Self::MissingFile | Self::NoBaseline | Self::MissingKey => 4,
            Self::LocalChanges => 5,
            Self::RemoteAuth | Self::RemoteNotFound | Self::RemoteError => 6,
            Self::ConfigError | Self::FileNotConfigured => 7,
            Self::IoError | Self::JsonError => 8,
            Self::MergeError => 9,
        }
    }

    /// Whether simply running the same command again may succeed.
    ///
    /// True for transport failures; the staged state is resumable with
    /// `--continue`.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteError | Self::IoError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in csvsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("No file named '{name}' in the config")]
    FileNotConfigured { name: String, available: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Sync(e) => match e {
                SyncError::OperationInProgress { .. } => ErrorCode::OperationInProgress,
                SyncError::NothingToResume { .. } => ErrorCode::NothingToResume,
                SyncError::NothingToAbort { .. } => ErrorCode::NothingToAbort,
                SyncError::CorruptStatus { .. } => ErrorCode::CorruptStatus,
                SyncError::MissingFile { .. } => ErrorCode::MissingFile,
                SyncError::NoBaseline { .. } => ErrorCode::NoBaseline,
                SyncError::MissingKey { .. } => ErrorCode::MissingKey,
                SyncError::WouldOverwriteLocalChanges { .. } => ErrorCode::LocalChanges,
                SyncError::Remote(RemoteError::Auth(_)) => ErrorCode::RemoteAuth,
                SyncError::Remote(RemoteError::NotFound { .. }) => ErrorCode::RemoteNotFound,
                SyncError::Remote(RemoteError::Config(_)) => ErrorCode::ConfigError,
                SyncError::Remote(_) => ErrorCode::RemoteError,
                SyncError::Merge(_) => ErrorCode::MergeError,
                SyncError::Io(_) => ErrorCode::IoError,
                SyncError::Json(_) => ErrorCode::JsonError,
                SyncError::StateMismatch { .. } | SyncError::InvalidTransition { .. } => {
                    ErrorCode::StateMismatch
                }
            },
            Self::FileNotConfigured { .. } => ErrorCode::FileNotConfigured,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Sync(e) => sync_hint(e),

            Self::FileNotConfigured { available, .. } => {
                if available.is_empty() {
                    Some("The config has no `files` entries yet.".to_string())
                } else {
                    let mut hint = String::from("Configured files:\n");
                    for name in available.iter().take(10) {
                        hint.push_str(&format!("    {name}\n"));
                    }
                    if available.len() > 10 {
                        hint.push_str(&format!("    ... and {} more\n", available.len() - 10));
                    }
                    Some(hint.trim_end().to_string())
                }
            }

            Self::Config(_) | Self::Io(_) | Self::Json(_) | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

fn sync_hint(e: &SyncError) -> Option<String> {
    match e {
        SyncError::OperationInProgress { command, .. } => Some(match command {
            Command::Sync => "A sync is in progress. \
                 Finish it with `csvsync sync <file> --continue` \
                 or abandon it with `csvsync abort <file>`."
                .to_string(),
            Command::Pull => "Finish the interrupted pull with `csvsync pull <file> --continue` \
                 or abandon it with `csvsync abort <file>`."
                .to_string(),
            Command::Push => {
                "Finish the interrupted push with `csvsync push <file> --continue`.".to_string()
            }
            Command::None => "Run `csvsync status <file>` to inspect the staged files.".to_string(),
        }),

        SyncError::WouldOverwriteLocalChanges { .. } => Some(
            "Merge your changes with `csvsync sync <file>`, or discard them with \
             `csvsync pull <file> --force` (the current copy is kept as a backup)."
                .to_string(),
        ),

        SyncError::NoBaseline { .. } => Some(
            "Run `csvsync pull <file>` or `csvsync push <file>` once to establish a baseline."
                .to_string(),
        ),

        SyncError::MissingKey { file } => Some(format!(
            "Set \"key\" to the row key column in files.{file} of the config."
        )),

        SyncError::NothingToResume { .. }
        | SyncError::NothingToAbort { .. }
        | SyncError::StateMismatch { .. } => {
            Some("Run `csvsync status <file>` to see the current state.".to_string())
        }

        SyncError::CorruptStatus { path, .. } => Some(format!(
            "Inspect {}; deleting it resets the file to READY.",
            path.display()
        )),

        SyncError::Remote(RemoteError::Auth(_)) => Some(
            "Check the token environment variable named by `token_env` in the remote config."
                .to_string(),
        ),

        SyncError::Remote(RemoteError::NotFound { .. }) => Some(
            "Check `spreadsheet_id` and `sheet` in the config. \
             `csvsync status <file>` shows whether the interrupted step can be aborted."
                .to_string(),
        ),

        SyncError::Remote(RemoteError::Transport(_)) => Some(
            "The staged files are intact; retry with `--continue` once the remote is reachable."
                .to_string(),
        ),

        SyncError::Merge(MergeError::MissingKeyColumn { .. } | MergeError::DuplicateKey { .. }) => {
            Some(
                "The key column must exist in every copy and hold unique values. \
                 Fix the working copy, then retry with `csvsync sync <file> --continue`. \
                 If the remote tab is at fault, run `csvsync abort <file>`, fix it there, \
                 and sync again."
                    .to_string(),
            )
        }

        _ => None,
    }
}

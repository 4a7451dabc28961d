//! Staged file roles and the operations between them.
//!
//! A tracked file occupies up to five paths during a sync cycle. All but the
//! working copy live in the stage directory, named after the file's basename
//! plus a role suffix:
//!
//! | Role | Path |
//! |---|---|
//! | `local` | the user's working file |
//! | `ancestor` | `<stage>/<basename>.SAVE` |
//! | `download` | `<stage>/<basename>.DOWNLOAD` |
//! | `backup` | `<stage>/<basename>.LOCAL` |
//! | `merge` | `<stage>/<basename>.MERGE` |

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::FileConfig;
use crate::sync::file::{atomic_copy, file_size, files_identical};
use crate::sync::types::{SyncError, SyncResult};

/// Suffix of the status record.
pub const STATUS_SUFFIX: &str = ".STATUS";

/// Fixed set of roles a file can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The user's working copy.
    Local,
    /// Last known common ancestor of local and remote.
    Ancestor,
    /// Snapshot fetched from the remote store.
    Download,
    /// Copy of the working file taken before a merge or forced pull.
    Backup,
    /// Merge engine output.
    Merge,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::Local,
        Self::Ancestor,
        Self::Download,
        Self::Backup,
        Self::Merge,
    ];

    /// Suffix appended to the basename inside the stage directory.
    #[must_use]
    pub const fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Local => None,
            Self::Ancestor => Some(".SAVE"),
            Self::Download => Some(".DOWNLOAD"),
            Self::Backup => Some(".LOCAL"),
            Self::Merge => Some(".MERGE"),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Ancestor => "ancestor",
            Self::Download => "download",
            Self::Backup => "backup",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths and file operations for one tracked file.
#[derive(Debug, Clone)]
pub struct StagingArea {
    local: PathBuf,
    stage_dir: PathBuf,
    basename: String,
}

impl StagingArea {
    #[must_use]
    pub fn new(
        local: impl Into<PathBuf>,
        stage_dir: impl Into<PathBuf>,
        basename: impl Into<String>,
    ) -> Self {
        Self {
            local: local.into(),
            stage_dir: stage_dir.into(),
            basename: basename.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &FileConfig) -> Self {
        Self::new(
            &config.filename,
            &config.stage_directory,
            &config.cache_name,
        )
    }

    #[must_use]
    pub fn stage_dir(&self) -> &Path {
        &self.stage_dir
    }

    /// Path of a role. Distinct roles never share a path.
    #[must_use]
    pub fn path_for(&self, role: Role) -> PathBuf {
        match role.suffix() {
            None => self.local.clone(),
            Some(suffix) => self.stage_dir.join(format!("{}{suffix}", self.basename)),
        }
    }

    /// Path of the status record.
    #[must_use]
    pub fn status_path(&self) -> PathBuf {
        self.stage_dir
            .join(format!("{}{STATUS_SUFFIX}", self.basename))
    }

    #[must_use]
    pub fn exists(&self, role: Role) -> bool {
        self.path_for(role).is_file()
    }

    #[must_use]
    pub fn size(&self, role: Role) -> u64 {
        file_size(&self.path_for(role))
    }

    fn require(&self, role: Role) -> SyncResult<PathBuf> {
        let path = self.path_for(role);
        if path.is_file() {
            Ok(path)
        } else {
            Err(SyncError::MissingFile { path })
        }
    }

    /// Create the stage directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_stage_dir(&self) -> SyncResult<()> {
        fs::create_dir_all(&self.stage_dir)?;
        Ok(())
    }

    /// Copy `src` over `dst`. The destination is replaced atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingFile`] if `src` does not exist, or an I/O
    /// error if the copy fails.
    pub fn copy(&self, src: Role, dst: Role) -> SyncResult<()> {
        let from = self.require(src)?;
        let to = self.path_for(dst);
        debug!(from = %from.display(), to = %to.display(), "copying {src} -> {dst}");
        atomic_copy(&from, &to)?;
        Ok(())
    }

    /// Rename `src` onto `dst`, promoting a transient artifact.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingFile`] if `src` does not exist, or an I/O
    /// error if the rename fails.
    pub fn rename(&self, src: Role, dst: Role) -> SyncResult<()> {
        let from = self.require(src)?;
        let to = self.path_for(dst);
        if let Some(parent) = to.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(from = %from.display(), to = %to.display(), "moving {src} -> {dst}");
        fs::rename(&from, &to)?;
        Ok(())
    }

    /// Delete a role's file if present.
    ///
    /// Never fails: a missing file is fine and any other error is logged.
    /// Returns `true` if a file was removed.
    pub fn remove(&self, role: Role) -> bool {
        let path = self.path_for(role);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed {role}");
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove {role}");
                false
            }
        }
    }

    /// Whether two roles hold byte-identical content.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingFile`] if either file is missing.
    pub fn identical(&self, a: Role, b: Role) -> SyncResult<bool> {
        let a = self.require(a)?;
        let b = self.require(b)?;
        Ok(files_identical(&a, &b)?)
    }
}

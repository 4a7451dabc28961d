//! The sync state machine.
//!
//! [`SyncController`] sequences the staging steps of `pull`, `push` and
//! `sync` and seals each one with a status transition. Staged effects
//! always land before the transition that records them, so the stored
//! phase is never ahead of what is on disk and every step can be replayed
//! after a crash.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{FileConfig, QuoteStyle};
use crate::merge::{MergeEngine, MergeInputs};
use crate::remote::RemoteStore;
use crate::sync::staging::{Role, StagingArea};
use crate::sync::status::StatusStore;
use crate::sync::types::{
    AbortOutcome, Command, Phase, PullOutcome, StagedFileInfo, StatusReport, SyncError,
    SyncOutcome, SyncResult, SyncStatus,
};

/// Whether `--continue` can pick up from `status`, and as which command.
fn resumable(status: SyncStatus) -> Option<Command> {
    match (status.phase, status.command) {
        (Phase::Pull, Command::Pull)
        | (Phase::Push, Command::Push)
        | (Phase::Pull | Phase::Merge | Phase::Resolve | Phase::Push, Command::Sync) => {
            Some(status.command)
        }
        _ => None,
    }
}

fn abortable(status: SyncStatus) -> bool {
    matches!(
        (status.phase, status.command),
        (Phase::Pull, Command::Pull) | (Phase::Pull | Phase::Merge | Phase::Resolve, Command::Sync)
    )
}

/// Drives one tracked file through the sync workflow.
pub struct SyncController<R, M> {
    name: String,
    staging: StagingArea,
    status: StatusStore,
    key_column: Option<String>,
    quote_style: QuoteStyle,
    resource_id: String,
    tab: String,
    remote: R,
    merger: M,
}

impl<R: RemoteStore, M: MergeEngine> SyncController<R, M> {
    pub fn new(config: &FileConfig, remote: R, merger: M) -> Self {
        let staging = StagingArea::from_config(config);
        let status = StatusStore::new(staging.status_path());

        Self {
            name: config.name.clone(),
            staging,
            status,
            key_column: config.key_column.clone(),
            quote_style: config.quote_style,
            resource_id: config.remote_resource_id.clone(),
            tab: config.remote_tab.clone(),
            remote,
            merger,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Current persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the status record is unreadable.
    pub fn current_status(&self) -> SyncResult<SyncStatus> {
        self.status.read()
    }

    fn require_ready(&self) -> SyncResult<()> {
        let current = self.status.read()?;
        if current.is_ready() {
            Ok(())
        } else {
            Err(SyncError::OperationInProgress {
                phase: current.phase,
                command: current.command,
            })
        }
    }

    fn require_key(&self) -> SyncResult<&str> {
        self.key_column
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SyncError::MissingKey {
                file: self.name.clone(),
            })
    }

    fn require_file(&self, role: Role) -> SyncResult<()> {
        if self.staging.exists(role) {
            Ok(())
        } else {
            Err(SyncError::MissingFile {
                path: self.staging.path_for(role),
            })
        }
    }

    /// Whether `pull` would clobber unsynced edits in the working copy.
    fn local_has_changes(&self) -> SyncResult<bool> {
        if !self.staging.exists(Role::Local) {
            return Ok(false);
        }
        if !self.staging.exists(Role::Ancestor) {
            return Ok(true);
        }
        Ok(!self.staging.identical(Role::Local, Role::Ancestor)?)
    }

    /// Fetch the remote tab into a fresh download slot.
    fn download(&self) -> SyncResult<()> {
        if self.staging.remove(Role::Download) {
            debug!("discarded stale download");
        }
        let destination = self.staging.path_for(Role::Download);
        info!(file = %self.name, "downloading {}/{}", self.resource_id, self.tab);
        self.remote
            .download(&self.resource_id, &self.tab, &destination)?;
        Ok(())
    }

    fn upload_ancestor(&self) -> SyncResult<()> {
        let source = self.staging.path_for(Role::Ancestor);
        info!(file = %self.name, "uploading {}/{}", self.resource_id, self.tab);
        self.remote.upload(&self.resource_id, &self.tab, &source)?;
        Ok(())
    }

    // -- pull --

    /// Replace the working copy with the remote tab.
    ///
    /// Refuses when the working copy has edits not yet synced, unless
    /// `force` is set, in which case the working copy is saved to the backup
    /// slot first.
    ///
    /// # Errors
    ///
    /// Returns an error if another operation is in progress, local changes
    /// would be lost, or the download fails.
    pub fn pull(&self, force: bool) -> SyncResult<PullOutcome> {
        self.require_ready()?;

        let mut outcome = PullOutcome::default();
        if self.local_has_changes()? {
            if !force {
                return Err(SyncError::WouldOverwriteLocalChanges {
                    path: self.staging.path_for(Role::Local),
                });
            }
            self.staging.copy(Role::Local, Role::Backup)?;
            let backup = self.staging.path_for(Role::Backup);
            warn!(backup = %backup.display(), "overwriting local changes");
            outcome.backup = Some(backup);
        }

        self.staging.ensure_stage_dir()?;
        self.status
            .transition(Phase::Ready, Phase::Pull, Some(Command::Pull))?;
        self.finish_pull()?;

        Ok(outcome)
    }

    fn finish_pull(&self) -> SyncResult<()> {
        self.download()?;
        self.staging.rename(Role::Download, Role::Ancestor)?;
        self.staging.copy(Role::Ancestor, Role::Local)?;
        self.status
            .transition(Phase::Pull, Phase::Ready, Some(Command::None))?;
        info!(file = %self.name, "pull complete");
        Ok(())
    }

    // -- push --

    /// Overwrite the remote tab with the working copy.
    ///
    /// # Errors
    ///
    /// Returns an error if another operation is in progress, the working
    /// copy is missing, or the upload fails.
    pub fn push(&self) -> SyncResult<()> {
        self.require_ready()?;
        self.require_file(Role::Local)?;

        self.staging.ensure_stage_dir()?;
        self.status
            .transition(Phase::Ready, Phase::Push, Some(Command::Push))?;
        self.finish_push()
    }

    fn finish_push(&self) -> SyncResult<()> {
        self.staging.copy(Role::Local, Role::Ancestor)?;
        self.upload_ancestor()?;
        self.status
            .transition(Phase::Push, Phase::Ready, Some(Command::None))?;
        info!(file = %self.name, "push complete");
        Ok(())
    }

    // -- sync --

    /// Start a three-way sync.
    ///
    /// Ends in READY when the merge is clean, or suspends in RESOLVE with
    /// conflict markers in the working copy. A suspension is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a precondition fails or a collaborator fails.
    pub fn sync_start(&self) -> SyncResult<SyncOutcome> {
        self.require_ready()?;
        if !self.staging.exists(Role::Ancestor) {
            return Err(SyncError::NoBaseline {
                path: self.staging.path_for(Role::Ancestor),
            });
        }
        self.require_key()?;
        self.require_file(Role::Local)?;

        self.status
            .transition(Phase::Ready, Phase::Pull, Some(Command::Sync))?;
        self.fetch_for_merge()?;
        self.run_merge()
    }

    /// Finish a sync suspended in RESOLVE, using the edited working copy.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NothingToResume`] unless the state is
    /// `(RESOLVE, sync)`, or any error from uploading.
    pub fn sync_continue(&self) -> SyncResult<SyncOutcome> {
        let current = self.status.read()?;
        if (current.phase, current.command) != (Phase::Resolve, Command::Sync) {
            return Err(SyncError::NothingToResume {
                phase: current.phase,
                command: current.command,
            });
        }
        self.complete()
    }

    /// PULL -> MERGE: fresh download plus a backup of the working copy.
    fn fetch_for_merge(&self) -> SyncResult<()> {
        self.download()?;
        self.staging.copy(Role::Local, Role::Backup)?;
        self.status.transition(Phase::Pull, Phase::Merge, None)?;
        Ok(())
    }

    /// MERGE -> RESOLVE, then finish if the merge was clean.
    fn run_merge(&self) -> SyncResult<SyncOutcome> {
        let key = self.require_key()?;
        for role in [Role::Ancestor, Role::Backup, Role::Download] {
            self.require_file(role)?;
        }

        let ancestor = self.staging.path_for(Role::Ancestor);
        let branch_a = self.staging.path_for(Role::Backup);
        let branch_b = self.staging.path_for(Role::Download);
        let output = self.staging.path_for(Role::Merge);

        let outcome = self.merger.merge(
            MergeInputs {
                ancestor: &ancestor,
                branch_a: &branch_a,
                branch_b: &branch_b,
            },
            key,
            self.quote_style,
            &output,
        )?;

        self.staging.copy(Role::Merge, Role::Local)?;
        self.status.transition(Phase::Merge, Phase::Resolve, None)?;

        if outcome.has_conflicts {
            let local = self.staging.path_for(Role::Local);
            warn!(file = %self.name, local = %local.display(), "merge has conflicts");
            return Ok(SyncOutcome::Conflicts { local });
        }

        self.complete()
    }

    /// Pick up edits made to the working copy after a failed merge.
    ///
    /// The working copy only receives merge output once the merge has
    /// succeeded, so a copy that matches neither the backup nor that output
    /// holds the user's repairs.
    fn refresh_backup(&self) -> SyncResult<()> {
        if !self.staging.exists(Role::Local) || !self.staging.exists(Role::Backup) {
            return Ok(());
        }
        if self.staging.identical(Role::Local, Role::Backup)? {
            return Ok(());
        }
        if self.staging.exists(Role::Merge) && self.staging.identical(Role::Local, Role::Merge)? {
            return Ok(());
        }
        self.staging.copy(Role::Local, Role::Backup)?;
        info!(file = %self.name, "working copy changed since the failed merge, using it");
        Ok(())
    }

    /// RESOLVE -> PUSH -> READY.
    fn complete(&self) -> SyncResult<SyncOutcome> {
        self.require_file(Role::Local)?;
        self.status.transition(Phase::Resolve, Phase::Push, None)?;
        self.finish_complete()
    }

    fn finish_complete(&self) -> SyncResult<SyncOutcome> {
        self.staging.copy(Role::Local, Role::Ancestor)?;

        let unchanged_remote = self.staging.exists(Role::Download)
            && self.staging.identical(Role::Download, Role::Ancestor)?;
        if unchanged_remote {
            info!(file = %self.name, "result matches remote, skipping upload");
        } else {
            self.upload_ancestor()?;
        }

        self.status
            .transition(Phase::Push, Phase::Ready, Some(Command::None))?;

        for role in [Role::Download, Role::Backup, Role::Merge] {
            self.staging.remove(role);
        }

        info!(file = %self.name, "sync complete");
        Ok(SyncOutcome::Completed {
            uploaded: !unchanged_remote,
        })
    }

    // -- recovery --

    /// The pending state, if `command` is the recipe waiting to resume.
    fn pending(&self, command: Command) -> SyncResult<SyncStatus> {
        let current = self.status.read()?;
        if current.command != command || resumable(current).is_none() {
            return Err(SyncError::NothingToResume {
                phase: current.phase,
                command: current.command,
            });
        }
        info!(file = %self.name, state = %current, "resuming");
        Ok(current)
    }

    /// Finish an interrupted `pull`, discarding any partial download.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NothingToResume`] unless the state is
    /// `(PULL, pull)`, or any error from the download.
    pub fn resume_pull(&self) -> SyncResult<PullOutcome> {
        self.pending(Command::Pull)?;
        self.finish_pull()?;
        Ok(PullOutcome::default())
    }

    /// Finish an interrupted `push`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NothingToResume`] unless the state is
    /// `(PUSH, push)`, or any error from the upload.
    pub fn resume_push(&self) -> SyncResult<()> {
        self.pending(Command::Push)?;
        self.finish_push()
    }

    /// Resume a `sync` from whichever step it last sealed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NothingToResume`] if no sync is pending, or any
    /// error from the resumed steps.
    pub fn resume_sync(&self) -> SyncResult<SyncOutcome> {
        let current = self.pending(Command::Sync)?;
        match current.phase {
            Phase::Pull => {
                self.fetch_for_merge()?;
                self.run_merge()
            }
            Phase::Merge => {
                self.refresh_backup()?;
                self.run_merge()
            }
            Phase::Resolve => self.complete(),
            Phase::Push => self.finish_complete(),
            Phase::Ready => Err(SyncError::NothingToResume {
                phase: current.phase,
                command: current.command,
            }),
        }
    }

    /// Abandon an in-flight sync, or a pull stuck before its download
    /// landed, and return to READY.
    ///
    /// Once the merge has touched the working copy, the pre-sync copy is
    /// restored from the backup. The backup goes last so a crash midway
    /// leaves abort re-runnable.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NothingToAbort`] if nothing abortable is in
    /// flight.
    pub fn abort(&self) -> SyncResult<AbortOutcome> {
        let current = self.status.read()?;
        if !abortable(current) {
            return Err(SyncError::NothingToAbort {
                phase: current.phase,
                command: current.command,
            });
        }

        let mut outcome = AbortOutcome {
            command: current.command,
            ..AbortOutcome::default()
        };
        if current.command == Command::Pull {
            // A forced pull keeps its backup; it may hold the only copy of
            // the overwritten edits.
            self.staging.remove(Role::Download);
        } else {
            let merged = matches!(current.phase, Phase::Merge | Phase::Resolve);
            if merged && self.staging.exists(Role::Backup) {
                self.staging.copy(Role::Backup, Role::Local)?;
                outcome.restored_local = true;
            }

            self.staging.remove(Role::Download);
            self.staging.remove(Role::Merge);
            self.staging.remove(Role::Backup);
        }

        self.status
            .transition(current.phase, Phase::Ready, Some(Command::None))?;
        info!(file = %self.name, from = %current, "{} aborted", current.command);
        Ok(outcome)
    }

    /// Diagnostic snapshot. Never fails: an unreadable record is reported
    /// in the result instead.
    #[must_use]
    pub fn status(&self) -> StatusReport {
        let (current, record_error) = match self.status.read() {
            Ok(current) => (current, None),
            Err(e) => (SyncStatus::READY, Some(e.to_string())),
        };

        let updated_at = self
            .status
            .updated_at()
            .ok()
            .flatten()
            .map(|t| t.to_rfc3339());

        let files = Role::ALL
            .iter()
            .map(|&role| StagedFileInfo {
                role,
                path: self.staging.path_for(role),
                exists: self.staging.exists(role),
                size: self.staging.size(role),
            })
            .collect();

        let local_modified =
            if self.staging.exists(Role::Local) && self.staging.exists(Role::Ancestor) {
                self.staging
                    .identical(Role::Local, Role::Ancestor)
                    .ok()
                    .map(|same| !same)
            } else {
                None
            };

        let healthy = record_error.is_none();
        StatusReport {
            name: self.name.clone(),
            phase: current.phase,
            command: current.command,
            updated_at,
            record_error,
            files,
            local_modified,
            resumable: resumable(current).filter(|_| healthy),
            abortable: healthy && abortable(current),
        }
    }

    /// Path of a staged role, for reporting.
    #[must_use]
    pub fn path_for(&self, role: Role) -> PathBuf {
        self.staging.path_for(role)
    }
}

//! Sync workflow properties, driven through the library with an in-memory
//! remote that counts transfers and can be told to fail.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use csvsync::config::{FileConfig, QuoteStyle, RemoteConfig};
use csvsync::merge::{KeyedMerge, MergeEngine, MergeError, MergeInputs, MergeOutcome};
use csvsync::remote::{RemoteError, RemoteStore};
use csvsync::sync::{
    Command, Phase, Role, StatusStore, SyncController, SyncError, SyncOutcome, SyncStatus,
};
use csvsync::table::TableError;
use tempfile::TempDir;

const BASE: &str = "id,name,city\n1,Ada,London\n2,Grace,Arlington\n3,Alan,Wilmslow\n";

// ── Collaborators ─────────────────────────────────────────────

#[derive(Default)]
struct RemoteState {
    content: RefCell<Option<Vec<u8>>>,
    downloads: Cell<usize>,
    uploads: Cell<usize>,
    fail_download: Cell<bool>,
    fail_upload: Cell<bool>,
}

/// Single-tab remote held in memory. Clones share state.
#[derive(Clone, Default)]
struct MemoryRemote(Rc<RemoteState>);

impl MemoryRemote {
    fn with_content(content: &str) -> Self {
        let remote = Self::default();
        remote.set(content);
        remote
    }

    fn set(&self, content: &str) {
        *self.0.content.borrow_mut() = Some(content.as_bytes().to_vec());
    }

    fn content(&self) -> String {
        String::from_utf8(self.0.content.borrow().clone().unwrap_or_default()).unwrap()
    }

    /// Forget the tab, as if it never existed remotely.
    fn clear(&self) {
        *self.0.content.borrow_mut() = None;
    }

    fn uploads(&self) -> usize {
        self.0.uploads.get()
    }

    fn fail_next_download(&self) {
        self.0.fail_download.set(true);
    }

    fn fail_next_upload(&self) {
        self.0.fail_upload.set(true);
    }
}

impl RemoteStore for MemoryRemote {
    fn download(
        &self,
        resource_id: &str,
        tab: &str,
        destination: &Path,
    ) -> Result<(), RemoteError> {
        if self.0.fail_download.replace(false) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        let content = self.0.content.borrow().clone().ok_or(RemoteError::NotFound {
            resource_id: resource_id.to_string(),
            tab: tab.to_string(),
        })?;
        fs::write(destination, content)?;
        self.0.downloads.set(self.0.downloads.get() + 1);
        Ok(())
    }

    fn upload(&self, _resource_id: &str, _tab: &str, source: &Path) -> Result<(), RemoteError> {
        if self.0.fail_upload.replace(false) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        *self.0.content.borrow_mut() = Some(fs::read(source)?);
        self.0.uploads.set(self.0.uploads.get() + 1);
        Ok(())
    }
}

/// Keyed merge that fails a set number of times first.
struct FlakyMerge {
    failures_left: Cell<usize>,
}

impl FlakyMerge {
    fn failing(times: usize) -> Self {
        Self {
            failures_left: Cell::new(times),
        }
    }
}

impl MergeEngine for FlakyMerge {
    fn merge(
        &self,
        inputs: MergeInputs<'_>,
        key_column: &str,
        quote_style: QuoteStyle,
        output: &Path,
    ) -> Result<MergeOutcome, MergeError> {
        let left = self.failures_left.get();
        if left > 0 {
            self.failures_left.set(left - 1);
            return Err(MergeError::Output(TableError::Io(io::Error::other(
                "simulated crash",
            ))));
        }
        KeyedMerge.merge(inputs, key_column, quote_style, output)
    }
}

// ── Fixture ───────────────────────────────────────────────────

struct Fixture {
    _temp_dir: TempDir,
    config: FileConfig,
    remote: MemoryRemote,
}

impl Fixture {
    /// A tracked file with a remote holding `remote_content` and nothing
    /// local yet.
    fn new(remote_content: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let config = FileConfig {
            name: "people".to_string(),
            filename: root.join("people.csv"),
            remote_resource_id: "book".to_string(),
            remote_tab: "People".to_string(),
            key_column: Some("id".to_string()),
            quote_style: QuoteStyle::Minimal,
            stage_directory: root.join("csvsync"),
            pad_lines: true,
            cache_name: "people.csv".to_string(),
            remote: RemoteConfig::Directory {
                path: root.join("unused"),
            },
        };

        Self {
            _temp_dir: temp_dir,
            config,
            remote: MemoryRemote::with_content(remote_content),
        }
    }

    /// Same fixture after an initial pull.
    fn pulled(remote_content: &str) -> Self {
        let fixture = Self::new(remote_content);
        fixture.controller().pull(false).unwrap();
        fixture
    }

    fn controller(&self) -> SyncController<MemoryRemote, KeyedMerge> {
        SyncController::new(&self.config, self.remote.clone(), KeyedMerge)
    }

    fn flaky_controller(&self, failures: usize) -> SyncController<MemoryRemote, FlakyMerge> {
        SyncController::new(&self.config, self.remote.clone(), FlakyMerge::failing(failures))
    }

    fn local(&self) -> PathBuf {
        self.config.filename.clone()
    }

    fn write_local(&self, content: &str) {
        fs::write(self.local(), content).unwrap();
    }

    fn read_local(&self) -> String {
        fs::read_to_string(self.local()).unwrap()
    }

    fn write_role(&self, role: Role, content: &str) {
        fs::write(self.controller().path_for(role), content).unwrap();
    }

    fn read_role(&self, role: Role) -> String {
        fs::read_to_string(self.controller().path_for(role)).unwrap()
    }

    /// Record `(phase, command)` as the last sealed step.
    fn seal(&self, phase: Phase, command: Command) {
        let sync = self.controller();
        StatusStore::new(sync.staging().status_path())
            .write(phase, command)
            .unwrap();
    }

    /// Content of every staged role, for before/after comparisons.
    fn snapshot(&self) -> Vec<Option<Vec<u8>>> {
        let sync = self.controller();
        let mut paths: Vec<PathBuf> = Role::ALL.iter().map(|r| sync.path_for(*r)).collect();
        paths.push(sync.staging().status_path());
        paths.iter().map(|p| fs::read(p).ok()).collect()
    }
}

// ── Properties ────────────────────────────────────────────────

#[test]
fn test_pull_never_overwrites_local_changes() {
    let fixture = Fixture::pulled(BASE);
    let edited = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    fixture.write_local(edited);
    fixture.remote.set("id,name,city\n1,Ada,Rome\n");

    let before = fixture.snapshot();
    let err = fixture.controller().pull(false).unwrap_err();

    assert!(matches!(err, SyncError::WouldOverwriteLocalChanges { .. }));
    assert_eq!(fixture.read_local(), edited);
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn test_pull_refuses_untracked_local_file() {
    let fixture = Fixture::new(BASE);
    fixture.write_local("id,name,city\n7,Mine,Here\n");

    let err = fixture.controller().pull(false).unwrap_err();
    assert!(matches!(err, SyncError::WouldOverwriteLocalChanges { .. }));
}

#[test]
fn test_push_then_pull_is_identity() {
    let fixture = Fixture::pulled(BASE);
    let edited = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    fixture.write_local(edited);

    let sync = fixture.controller();
    sync.push().unwrap();
    sync.pull(false).unwrap();

    assert_eq!(fixture.read_local(), edited);
    assert_eq!(fixture.remote.content(), edited);
}

#[test]
fn test_conflicting_edits_suspend_in_resolve() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture
        .remote
        .set("id,name,city\n1,Ada,Rome\n2,Grace,Arlington\n3,Alan,Wilmslow\n");

    let sync = fixture.controller();
    let outcome = sync.sync_start().unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Conflicts {
            local: fixture.local()
        }
    );
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Resolve, Command::Sync)
    );
    assert!(fixture.read_local().contains("<<<<<<< Paris ======= Rome >>>>>>>"));
    assert_eq!(fixture.remote.uploads(), 0);
}

#[test]
fn test_disjoint_edits_upload_once() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture
        .remote
        .set("id,name,city\n1,Ada,London\n2,Grace,Arlington\n3,Alan,Manchester\n");

    let sync = fixture.controller();
    let outcome = sync.sync_start().unwrap();

    let merged = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Manchester\n";
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(fixture.remote.uploads(), 1);
    assert_eq!(fixture.remote.content(), merged);
    assert_eq!(fixture.read_local(), merged);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_merge_equal_to_remote_skips_upload() {
    let fixture = Fixture::pulled(BASE);
    let remote_edit = "id,name,city\n1,Ada,London\n2,Grace,New York\n3,Alan,Wilmslow\n";
    fixture.remote.set(remote_edit);

    let sync = fixture.controller();
    let outcome = sync.sync_start().unwrap();

    assert_eq!(outcome, SyncOutcome::Completed { uploaded: false });
    assert_eq!(fixture.remote.uploads(), 0);
    assert_eq!(fixture.read_local(), remote_edit);
}

#[test]
fn test_push_during_resolve_touches_nothing() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture
        .remote
        .set("id,name,city\n1,Ada,Rome\n2,Grace,Arlington\n3,Alan,Wilmslow\n");

    let sync = fixture.controller();
    sync.sync_start().unwrap();

    let before = fixture.snapshot();
    let err = sync.push().unwrap_err();

    assert!(matches!(
        err,
        SyncError::OperationInProgress {
            phase: Phase::Resolve,
            command: Command::Sync
        }
    ));
    assert_eq!(fixture.snapshot(), before);
    assert_eq!(fixture.remote.uploads(), 0);
}

#[test]
fn test_resolve_then_continue() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture
        .remote
        .set("id,name,city\n1,Ada,Rome\n2,Grace,Arlington\n3,Alan,Wilmslow\n");

    let sync = fixture.controller();
    sync.sync_start().unwrap();

    let resolved = "id,name,city\n1,Ada,Florence\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    fixture.write_local(resolved);
    let outcome = sync.sync_continue().unwrap();

    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(fixture.remote.content(), resolved);
    assert_eq!(
        fs::read_to_string(sync.path_for(Role::Ancestor)).unwrap(),
        resolved
    );
}

// ── Crash recovery ────────────────────────────────────────────

#[test]
fn test_resume_after_failed_pull_download() {
    let fixture = Fixture::new(BASE);
    fixture.remote.fail_next_download();

    let sync = fixture.controller();
    assert!(matches!(sync.pull(false), Err(SyncError::Remote(_))));
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Pull, Command::Pull)
    );
    assert!(matches!(
        sync.pull(false),
        Err(SyncError::OperationInProgress { .. })
    ));

    sync.resume_pull().unwrap();
    assert_eq!(fixture.read_local(), BASE);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_resume_after_failed_push_upload() {
    let fixture = Fixture::pulled(BASE);
    let edited = "id,name,city\n1,Ada,Paris\n";
    fixture.write_local(edited);
    fixture.remote.fail_next_upload();

    let sync = fixture.controller();
    assert!(sync.push().is_err());
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Push, Command::Push)
    );

    // Resuming as a different command is refused
    assert!(matches!(
        sync.resume_sync(),
        Err(SyncError::NothingToResume { .. })
    ));

    sync.resume_push().unwrap();
    assert_eq!(fixture.remote.content(), edited);
    assert_eq!(fixture.remote.uploads(), 1);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_resume_sync_after_failed_download() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture.remote.fail_next_download();

    let sync = fixture.controller();
    assert!(sync.sync_start().is_err());
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Pull, Command::Sync)
    );

    let outcome = sync.resume_sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(fixture.remote.uploads(), 1);
}

#[test]
fn test_resume_sync_after_failed_merge() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture
        .remote
        .set("id,name,city\n1,Ada,London\n2,Grace,Arlington\n3,Alan,Manchester\n");

    let sync = fixture.flaky_controller(1);
    assert!(matches!(sync.sync_start(), Err(SyncError::Merge(_))));
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Merge, Command::Sync)
    );
    assert!(sync.staging().exists(Role::Backup));
    assert!(sync.staging().exists(Role::Download));

    // Replaying the merge step twice is harmless
    let outcome = sync.resume_sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(
        fixture.read_local(),
        "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Manchester\n"
    );
    assert_eq!(fixture.remote.uploads(), 1);
}

#[test]
fn test_resume_sync_after_failed_upload() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture.remote.fail_next_upload();

    let sync = fixture.controller();
    assert!(sync.sync_start().is_err());
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Push, Command::Sync)
    );

    let outcome = sync.resume_sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(
        fixture.remote.content(),
        "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n"
    );
    for role in [Role::Download, Role::Backup, Role::Merge] {
        assert!(!sync.staging().exists(role));
    }
}

#[test]
fn test_abort_interrupted_sync_before_merge() {
    let fixture = Fixture::pulled(BASE);
    let mine = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    fixture.write_local(mine);
    fixture.remote.fail_next_download();

    let sync = fixture.controller();
    assert!(sync.sync_start().is_err());

    let outcome = sync.abort().unwrap();
    assert!(!outcome.restored_local);
    assert_eq!(fixture.read_local(), mine);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_stale_download_is_replaced() {
    let fixture = Fixture::pulled(BASE);
    let sync = fixture.controller();
    fs::write(sync.path_for(Role::Download), "id,name,city\n9,Stale,Data\n").unwrap();

    let remote_edit = "id,name,city\n1,Ada,London\n2,Grace,New York\n3,Alan,Wilmslow\n";
    fixture.remote.set(remote_edit);
    sync.pull(false).unwrap();

    assert_eq!(fixture.read_local(), remote_edit);
    assert!(!sync.staging().exists(Role::Download));
}

#[test]
fn test_status_reports_interrupted_sync() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local("id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n");
    fixture.remote.fail_next_upload();

    let sync = fixture.controller();
    assert!(sync.sync_start().is_err());

    let report = sync.status();
    assert_eq!(report.phase, Phase::Push);
    assert_eq!(report.resumable, Some(Command::Sync));
    assert!(!report.abortable);
    assert!(report.file(Role::Download).unwrap().exists);
}

#[test]
fn test_continue_without_working_copy_keeps_resolve() {
    let fixture = Fixture::pulled(BASE);
    let mine = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    fixture.write_local(mine);
    fixture
        .remote
        .set("id,name,city\n1,Ada,Rome\n2,Grace,Arlington\n3,Alan,Wilmslow\n");

    let sync = fixture.controller();
    sync.sync_start().unwrap();
    fs::remove_file(fixture.local()).unwrap();

    assert!(matches!(
        sync.sync_continue(),
        Err(SyncError::MissingFile { .. })
    ));
    assert!(matches!(
        sync.resume_sync(),
        Err(SyncError::MissingFile { .. })
    ));
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Resolve, Command::Sync)
    );
    assert_eq!(fixture.remote.uploads(), 0);

    // Still abortable, and abort brings the working copy back
    let outcome = sync.abort().unwrap();
    assert!(outcome.restored_local);
    assert_eq!(fixture.read_local(), mine);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_resume_after_merge_error_uses_repaired_working_copy() {
    let fixture = Fixture::pulled(BASE);
    fixture.write_local(
        "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n3,Alan,Again\n",
    );

    let sync = fixture.controller();
    assert!(matches!(
        sync.sync_start(),
        Err(SyncError::Merge(MergeError::DuplicateKey { .. }))
    ));
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Merge, Command::Sync)
    );

    let repaired = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    fixture.write_local(repaired);

    let outcome = sync.resume_sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(fixture.read_local(), repaired);
    assert_eq!(fixture.remote.content(), repaired);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_abort_pull_stuck_on_missing_tab() {
    let fixture = Fixture::new(BASE);
    fixture.remote.clear();

    let sync = fixture.controller();
    assert!(matches!(
        sync.pull(false),
        Err(SyncError::Remote(RemoteError::NotFound { .. }))
    ));
    assert_eq!(
        sync.current_status().unwrap(),
        SyncStatus::new(Phase::Pull, Command::Pull)
    );
    assert!(sync.status().abortable);

    let outcome = sync.abort().unwrap();
    assert_eq!(outcome.command, Command::Pull);
    assert!(!outcome.restored_local);
    assert!(sync.current_status().unwrap().is_ready());

    fixture.remote.set(BASE);
    sync.pull(false).unwrap();
    assert_eq!(fixture.read_local(), BASE);
}

#[test]
fn test_abort_forced_pull_keeps_backup() {
    let fixture = Fixture::pulled(BASE);
    let mine = "id,name,city\n1,Ada,Paris\n";
    fixture.write_local(mine);
    fixture.remote.clear();

    let sync = fixture.controller();
    assert!(sync.pull(true).is_err());
    sync.abort().unwrap();

    assert!(sync.current_status().unwrap().is_ready());
    assert_eq!(fixture.read_local(), mine);
    assert_eq!(fixture.read_role(Role::Backup), mine);
}

// ── Crash between a staging step and its transition ───────────

#[test]
fn test_resume_pull_after_promoting_download() {
    let fixture = Fixture::pulled(BASE);
    let theirs = "id,name,city\n1,Ada,London\n2,Grace,New York\n3,Alan,Wilmslow\n";
    fixture.remote.set(theirs);

    // Download renamed to ancestor, working copy not yet replaced
    fixture.write_role(Role::Ancestor, theirs);
    fixture.seal(Phase::Pull, Command::Pull);

    let sync = fixture.controller();
    let report = sync.status();
    assert_eq!(report.phase, Phase::Pull);
    assert_eq!(report.resumable, Some(Command::Pull));

    sync.resume_pull().unwrap();
    assert_eq!(fixture.read_local(), theirs);
    assert_eq!(fixture.read_role(Role::Ancestor), theirs);
    assert!(!sync.staging().exists(Role::Download));
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_resume_sync_after_copying_merge_to_local() {
    let fixture = Fixture::pulled(BASE);
    let mine = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";
    let theirs = "id,name,city\n1,Ada,London\n2,Grace,Arlington\n3,Alan,Manchester\n";
    let merged = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Manchester\n";
    fixture.remote.set(theirs);

    // Merge output already in the working copy, MERGE -> RESOLVE not sealed
    fixture.write_role(Role::Download, theirs);
    fixture.write_role(Role::Backup, mine);
    fixture.write_role(Role::Merge, merged);
    fixture.write_local(merged);
    fixture.seal(Phase::Merge, Command::Sync);

    let sync = fixture.controller();
    let report = sync.status();
    assert_eq!(report.resumable, Some(Command::Sync));
    assert!(report.abortable);

    let outcome = sync.resume_sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(fixture.read_local(), merged);
    assert_eq!(fixture.read_role(Role::Ancestor), merged);
    assert_eq!(fixture.remote.content(), merged);
    assert_eq!(fixture.remote.uploads(), 1);
    assert!(sync.current_status().unwrap().is_ready());
}

#[test]
fn test_resume_sync_after_saving_ancestor() {
    let fixture = Fixture::pulled(BASE);
    let mine = "id,name,city\n1,Ada,Paris\n2,Grace,Arlington\n3,Alan,Wilmslow\n";

    // Local copied to ancestor, upload not yet done
    fixture.write_local(mine);
    fixture.write_role(Role::Download, BASE);
    fixture.write_role(Role::Backup, mine);
    fixture.write_role(Role::Merge, mine);
    fixture.write_role(Role::Ancestor, mine);
    fixture.seal(Phase::Push, Command::Sync);

    let sync = fixture.controller();
    let report = sync.status();
    assert_eq!(report.resumable, Some(Command::Sync));
    assert!(!report.abortable);

    let outcome = sync.resume_sync().unwrap();
    assert_eq!(outcome, SyncOutcome::Completed { uploaded: true });
    assert_eq!(fixture.remote.content(), mine);
    assert_eq!(fixture.remote.uploads(), 1);
    for role in [Role::Download, Role::Backup, Role::Merge] {
        assert!(!sync.staging().exists(role));
    }
    assert!(sync.current_status().unwrap().is_ready());
}

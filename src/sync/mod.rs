//! Resumable three-way sync of one tracked file.
//!
//! This module owns the on-disk state of a sync cycle:
//!
//! - **Status**: durable `(phase, command)` record, replaced atomically
//! - **Staging**: the five file roles (local, ancestor, download, backup,
//!   merge) and the copy/move/remove operations between them
//! - **Controller**: the state machine sequencing the remote store, the
//!   merge engine and the staging steps
//!
//! # Architecture
//!
//! Every invocation is a fresh process. It rebuilds where the previous one
//! stopped from the status record and the staged files alone:
//! 1. Each recipe step stages its files first
//! 2. A status transition then seals the step
//! 3. An interrupted recipe is resumed with `--continue` or abandoned with
//!    `abort`
//!
//! # Example
//!
//! ```ignore
//! use csvsync::merge::KeyedMerge;
//! use csvsync::sync::{SyncController, SyncOutcome};
//!
//! let sync = SyncController::new(&config, remote, KeyedMerge);
//! match sync.sync_start()? {
//!     SyncOutcome::Completed { uploaded } => println!("done (uploaded: {uploaded})"),
//!     SyncOutcome::Conflicts { local } => println!("resolve {}", local.display()),
//! }
//! ```
//!
//! Concurrent invocations on the same file are not supported; there is no
//! lock, only the in-progress guard.

mod controller;
mod file;
mod staging;
mod status;
mod types;

pub use controller::SyncController;
pub use file::{atomic_copy, atomic_write, file_size, files_identical};
pub use staging::{Role, StagingArea, STATUS_SUFFIX};
pub use status::StatusStore;
pub use types::{
    AbortOutcome, Command, Phase, PullOutcome, StagedFileInfo, StatusReport, SyncError,
    SyncOutcome, SyncResult, SyncStatus,
};
